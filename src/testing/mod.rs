//! Version matrix runner
//!
//! Reads a YAML matrix plan, runs the fixture once per framework version
//! through a [`Harness`](crate::harness::Harness), and checks the parsed
//! report of every run. Assertions are made against the report tree rather
//! than console output.

mod config;
mod runner;

pub use config::*;
pub use runner::{
    check_report_file, run_matrix, run_scenario, verify_report, MatrixReport, RunOptions,
    ScenarioOutcome,
};
