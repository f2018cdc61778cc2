//! Error types for report-matrix
//!
//! Each variant belongs to one [`ErrorKind`] so a matrix report can say
//! whether a scenario died in the build, on a missing or malformed report,
//! or on an expectation that did not hold.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::harness::SuiteCounts;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for report-matrix
#[derive(Error, Debug)]
pub enum Error {
    // === Harness Errors ===
    #[error("Build tool '{0}' not found. Set harness.executable in the config file")]
    HarnessNotFound(String),

    #[error("Harness execution failed: {0}")]
    HarnessExecution(String),

    #[error("Unexpected test summary: expected {expected}, got {actual}")]
    UnexpectedSummary {
        expected: SuiteCounts,
        actual: SuiteCounts,
    },

    #[error("Harness timed out after {0} seconds")]
    Timeout(u64),

    // === Report Errors ===
    #[error("Report file not found: {}", .path.display())]
    ReportNotFound { path: PathBuf },

    #[error("Malformed report: {0}")]
    Parse(String),

    #[error("Unsupported report encoding '{0}'. Supported: UTF-8, US-ASCII, ISO-8859-1")]
    UnsupportedEncoding(String),

    // === Assertion Errors ===
    #[error("Expected exactly {expected} <{tag}> element(s), found {actual}")]
    NodeCount {
        tag: String,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Attribute '{attribute}' of <{element}>: expected {}, got {}",
        describe(.expected.as_deref()),
        describe(.actual.as_deref())
    )]
    AttributeMismatch {
        element: String,
        attribute: String,
        expected: Option<String>,
        actual: Option<String>,
    },

    #[error("{failed} of {total} scenario(s) failed")]
    ScenariosFailed { failed: usize, total: usize },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid scenario plan: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

fn describe(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("{:?}", v),
        None => "<absent>".to_string(),
    }
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    HarnessExecution,
    ReportNotFound,
    Parse,
    AssertionMismatch,
    Config,
    Internal,
}

impl Error {
    /// Which failure class this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::HarnessNotFound(_)
            | Error::HarnessExecution(_)
            | Error::UnexpectedSummary { .. }
            | Error::Timeout(_) => ErrorKind::HarnessExecution,
            Error::ReportNotFound { .. } => ErrorKind::ReportNotFound,
            Error::Parse(_) | Error::UnsupportedEncoding(_) => ErrorKind::Parse,
            Error::NodeCount { .. }
            | Error::AttributeMismatch { .. }
            | Error::ScenariosFailed { .. } => ErrorKind::AssertionMismatch,
            Error::Config(_) | Error::ConfigParse(_) | Error::Yaml(_) => ErrorKind::Config,
            Error::Io(_) | Error::FileRead { .. } | Error::Json(_) | Error::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Create a node count error
    pub fn node_count(tag: &str, expected: usize, actual: usize) -> Self {
        Self::NodeCount {
            tag: tag.to_string(),
            expected,
            actual,
        }
    }

    /// Create an attribute mismatch error
    pub fn attribute_mismatch(
        element: &str,
        attribute: &str,
        expected: Option<&str>,
        actual: Option<&str>,
    ) -> Self {
        Self::AttributeMismatch {
            element: element.to_string(),
            attribute: attribute.to_string(),
            expected: expected.map(str::to_string),
            actual: actual.map(str::to_string),
        }
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: &io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}
