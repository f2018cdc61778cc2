//! report-matrix - version-matrix runner for XML test reports
//!
//! Runs a fixture project once per test-framework version through an
//! external build tool, then checks the per-class XML report of each run:
//! exactly one test case, exactly one outcome element, and exact (or
//! absent) `message` / `type` attributes.

pub mod cli;
pub mod commands;
pub mod common;
pub mod harness;
pub mod report;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, ErrorKind, Result};
pub use harness::{ExecutionResult, Harness, Invocation, SuiteCounts, Workspace};
pub use report::ReportNode;
pub use testing::{MatrixPlan, OutcomeKind, RunOptions, ScenarioExpectation};
