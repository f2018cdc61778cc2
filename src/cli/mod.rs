//! CLI command handling
//!
//! Dispatches CLI commands to the matrix runner and report reader and
//! formats their output.

use std::path::Path;

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::harness::ProcessHarness;
use crate::report::{self, ReportNode};
use crate::testing::{self, MatrixPlan, OutcomeExpectation, ReportTarget, RunOptions};

/// Outcome elements a test case may carry
const OUTCOME_TAGS: [&str; 3] = ["skipped", "failure", "error"];

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Run {
            plan,
            jobs,
            versions,
            verbose: _,
            json,
        } => {
            let plan = MatrixPlan::load(&plan)?;
            let harness =
                ProcessHarness::from_config(&config.harness, config.timeouts.harness_secs)?;

            let mut options = RunOptions::from_config(&config);
            if let Some(jobs) = jobs {
                if jobs == 0 {
                    return Err(Error::Config("--jobs must be at least 1".to_string()));
                }
                options.jobs = jobs;
            }
            options.versions = versions;
            options.quiet = json;

            let report = testing::run_matrix(&harness, &plan, &options).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }

            if !report.all_passed() {
                return Err(Error::ScenariosFailed {
                    failed: report.failed(),
                    total: report.outcomes.len(),
                });
            }
            Ok(())
        }

        Commands::Check {
            report,
            class_name,
            outcome,
            test_name,
            message,
            type_name,
            encoding,
        } => {
            let target = ReportTarget {
                class_name,
                test_name,
                encoding: encoding.unwrap_or_else(|| config.runner.encoding.clone()),
            };
            let expect = OutcomeExpectation {
                outcome,
                message,
                type_name,
            };

            testing::check_report_file(&report, &target, &expect)?;
            println!(
                "{} {} matches: one <{}> for {}",
                "✓".green(),
                report.display(),
                expect.outcome.tag(),
                target.class_name
            );
            Ok(())
        }

        Commands::Inspect { report, encoding } => {
            let encoding = encoding.unwrap_or_else(|| config.runner.encoding.clone());
            inspect(&report, &encoding)
        }
    }
}

fn inspect(path: &Path, encoding: &str) -> Result<()> {
    let root = report::parse_file(path, encoding)?;

    println!("{} <{}>", path.display().to_string().white().bold(), root.tag);
    for name in root.attribute_names() {
        if let Some(value) = root.attribute(name) {
            println!("  {} = {}", name.dimmed(), value);
        }
    }

    let cases = root.children("testcase");
    if cases.is_empty() {
        println!("  (no test cases)");
        return Ok(());
    }

    for case in cases {
        println!(
            "\n  {}.{}",
            case.attribute("classname").unwrap_or("?"),
            case.attribute("name").unwrap_or("?").bold()
        );

        let outcomes: Vec<&ReportNode> = OUTCOME_TAGS
            .iter()
            .flat_map(|tag| case.children(tag))
            .collect();
        if outcomes.is_empty() {
            println!("    {}", "passed".green());
        }
        for outcome in outcomes {
            println!("    {}", outcome.tag.yellow());
            println!("      message: {}", show(outcome.attribute("message")));
            println!("      type:    {}", show(outcome.attribute("type")));
        }
    }
    Ok(())
}

fn show(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("{:?}", v),
        None => "<absent>".dimmed().to_string(),
    }
}
