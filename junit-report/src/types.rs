//! Core types for the JUnit report library
//!
//! This module defines the test results read from JUnit XML files and the
//! error type shared by every stage of report processing.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used for report generation times
pub type Timestamp = DateTime<Utc>;

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while reading results or building reports
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to parse JUnit XML: {0}")]
    XmlParse(String),

    #[error("Invalid attribute '{name}': {value:?}")]
    InvalidAttribute { name: String, value: String },

    #[error("Missing element: {0}")]
    MissingElement(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a single test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Error,
    Skipped,
    /// A status string this tool does not recognise, kept verbatim
    Other(String),
}

impl TestStatus {
    /// Parse the `status` attribute of a `<testcase>` element
    pub fn from_attr(value: &str) -> Self {
        match value {
            "passed" => TestStatus::Passed,
            "failed" => TestStatus::Failed,
            "error" => TestStatus::Error,
            "skipped" => TestStatus::Skipped,
            other => TestStatus::Other(other.to_string()),
        }
    }

    /// The text written into the report's status column
    pub fn as_str(&self) -> &str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Error => "error",
            TestStatus::Skipped => "skipped",
            TestStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure or error details attached to a test case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// Value of the `type` attribute (e.g. an exception class)
    pub kind: Option<String>,
    /// Text content of the `<error>`/`<failure>` element
    pub message: Option<String>,
}

/// A single `<testcase>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub classname: Option<String>,
    /// Duration in seconds, as written in the file
    pub time: Option<String>,
    pub status: TestStatus,
    pub failure: Option<Failure>,
    /// Captured `<system-out>`, which holds the executed steps
    pub system_out: Option<String>,
}

/// A parsed `<testsuite>` with its cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    pub name: String,
    pub tests: u32,
    pub failures: u32,
    pub errors: u32,
    pub skipped: u32,
    pub timestamp: Option<NaiveDateTime>,
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    /// Number of tests that actually ran
    pub fn executed(&self) -> u32 {
        self.tests.saturating_sub(self.skipped)
    }

    /// Percentage of executed tests that passed, or `None` if nothing ran
    pub fn percent_passing(&self) -> Option<f64> {
        let executed = self.executed();
        if executed == 0 {
            return None;
        }
        let passed = self.tests as f64
            - self.failures as f64
            - self.errors as f64
            - self.skipped as f64;
        Some(100.0 * passed / executed as f64)
    }

    /// Condensed per-suite numbers shown in the summary table
    pub fn summary(&self) -> SuiteSummary {
        SuiteSummary {
            name: self.name.clone(),
            executed: self.executed(),
            failures: self.failures,
            errors: self.errors,
            percent_passing: self.percent_passing(),
        }
    }
}

/// One row of the summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub name: String,
    pub executed: u32,
    pub failures: u32,
    pub errors: u32,
    pub percent_passing: Option<f64>,
}

impl SuiteSummary {
    /// Percent column text: one decimal place, or `N/A%` when no test ran
    pub fn percent_label(&self) -> String {
        match self.percent_passing {
            Some(p) => format!("{:.1}%", p),
            None => "N/A%".to_string(),
        }
    }
}
