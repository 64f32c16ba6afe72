//! # rustdio-core
//!
//! Pure-logic core of the rustdio buffered stream library.
//!
//! This crate holds everything that can be specified and tested without a
//! file descriptor: the buffering state machine, open-mode parsing, and
//! the restricted formatter. The `rustdio` crate wires these to the OS.
//! No `unsafe` code is permitted at the crate level.

#![deny(unsafe_code)]

pub mod buffer;
pub mod fmt;
pub mod mode;

pub use buffer::{BUFSIZ, BufMode, FlushPlan, IoDirection, LastOp, Prelude, StreamBuffer, prelude};
pub use fmt::{FmtArg, FmtError};
pub use mode::{AccessMode, OpenFlags, parse_mode};
