//! CLI command definitions
//!
//! Defines the clap commands for the report-matrix CLI.

use clap::Subcommand;
use std::path::PathBuf;

use crate::testing::OutcomeKind;

#[derive(Subcommand)]
pub enum Commands {
    /// Run every scenario of a YAML matrix plan
    Run {
        /// Path to the YAML matrix plan
        plan: PathBuf,

        /// Scenarios to run at the same time (default: runner.jobs from config)
        #[arg(long, short)]
        jobs: Option<usize>,

        /// Only run this framework version (repeatable)
        #[arg(long = "only", value_name = "VERSION")]
        versions: Vec<String>,

        /// Verbose output
        #[arg(long, short)]
        verbose: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check an existing report file without running a build
    Check {
        /// Path to a TEST-<class>.xml report
        report: PathBuf,

        /// Fully qualified test class expected in the report
        #[arg(long = "class")]
        class_name: String,

        /// Outcome element the test case must carry
        #[arg(long, value_enum)]
        outcome: OutcomeKind,

        /// Expected test method name
        #[arg(long)]
        test_name: Option<String>,

        /// Expected message attribute (absent when omitted)
        #[arg(long)]
        message: Option<String>,

        /// Expected type attribute (absent when omitted)
        #[arg(long = "type")]
        type_name: Option<String>,

        /// Report encoding (default: runner.encoding from config)
        #[arg(long)]
        encoding: Option<String>,
    },

    /// Print the test cases of a report file
    Inspect {
        /// Path to a report file
        report: PathBuf,

        /// Report encoding (default: runner.encoding from config)
        #[arg(long)]
        encoding: Option<String>,
    },
}
