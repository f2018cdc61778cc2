//! Execution harness
//!
//! The harness owns everything about actually running a fixture build:
//! unpacking the fixture into an isolated [`Workspace`], invoking the build
//! tool with a framework version, and reporting the summary counts plus
//! where the per-class reports landed.

mod process;
mod workspace;

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;

use crate::common::{paths, Error, Result};

pub use process::{parse_summary, ProcessHarness};
pub use workspace::Workspace;

/// Test counts reported by a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SuiteCounts {
    pub total: u32,
    pub errors: u32,
    pub failures: u32,
    pub skipped: u32,
}

impl SuiteCounts {
    pub fn new(total: u32, errors: u32, failures: u32, skipped: u32) -> Self {
        Self {
            total,
            errors,
            failures,
            skipped,
        }
    }
}

impl fmt::Display for SuiteCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(tests={}, errors={}, failures={}, skipped={})",
            self.total, self.errors, self.failures, self.skipped
        )
    }
}

/// One build request
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Fixture name, for logging
    pub fixture: String,
    /// Framework version passed to the build
    pub version: String,
    /// Goals in execution order, report goal last
    pub goals: Vec<String>,
}

impl Invocation {
    pub fn new(fixture: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            fixture: fixture.into(),
            version: version.into(),
            goals: Vec::new(),
        }
    }

    pub fn with_goals(mut self, goals: &[String]) -> Self {
        self.goals.extend(goals.iter().cloned());
        self
    }

    /// Append the report-generation goal; empty names are ignored
    pub fn with_report_goal(mut self, goal: Option<&str>) -> Self {
        if let Some(goal) = goal.filter(|g| !g.trim().is_empty()) {
            self.goals.push(goal.to_string());
        }
        self
    }
}

/// What a finished build produced
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub counts: SuiteCounts,
    /// Directory holding `TEST-<class>.xml` files
    pub reports_dir: PathBuf,
}

impl ExecutionResult {
    /// Fail unless the build summary matches `expected` exactly
    pub fn assert_counts(&self, expected: SuiteCounts) -> Result<()> {
        if self.counts != expected {
            return Err(Error::UnexpectedSummary {
                expected,
                actual: self.counts,
            });
        }
        Ok(())
    }

    /// Path of the report for `class_name`, which must exist
    pub fn report_file(&self, class_name: &str) -> Result<PathBuf> {
        let path = self.reports_dir.join(paths::report_file_name(class_name));
        if !path.is_file() {
            return Err(Error::ReportNotFound { path });
        }
        Ok(path)
    }
}

/// Something that can build a fixture workspace against a framework version
#[async_trait]
pub trait Harness: Send + Sync {
    async fn execute(&self, workspace: &Workspace, invocation: &Invocation)
        -> Result<ExecutionResult>;
}

/// Reports directory under a workspace
pub(crate) fn reports_dir_in(workspace: &Path, reports_dir: &Path) -> PathBuf {
    paths::resolve_relative(workspace, reports_dir)
}
