//! Scenario reports.

use serde::{Deserialize, Serialize};

/// Outcome of a single conformance scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario identifier.
    pub scenario: String,
    /// Whether the observed behavior matched the contract.
    pub passed: bool,
    /// Human-readable evidence (digests, counts, mismatch description).
    pub detail: String,
}

impl ScenarioReport {
    pub fn pass(scenario: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            passed: true,
            detail: detail.into(),
        }
    }

    pub fn fail(scenario: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            passed: false,
            detail: detail.into(),
        }
    }
}

/// A full harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Harness crate version.
    pub version: String,
    pub total: usize,
    pub passed: usize,
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    pub fn new(scenarios: Vec<ScenarioReport>) -> Self {
        let passed = scenarios.iter().filter(|s| s.passed).count();
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            total: scenarios.len(),
            passed,
            scenarios,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
