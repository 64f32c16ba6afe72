//! Conformance harness for rustdio.
//!
//! Runs the testable properties of the stream contract as executable
//! scenarios against a real work directory:
//! - round-trip integrity (sha256 against an independent read)
//! - buffer-size independence across capacities and chunk plans
//! - line splitting, EOF and seek behavior
//! - access-mode rejection
//! - formatted-write output
//! - unbuffered pass-through
//!
//! Reports are emitted human-readable or as JSON for machine diffing.

#![forbid(unsafe_code)]

pub mod report;
pub mod scenarios;

pub use report::{RunReport, ScenarioReport};
pub use scenarios::{HarnessError, run_all};
