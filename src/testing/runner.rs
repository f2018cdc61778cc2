//! Scenario runner implementation
//!
//! Each scenario unpacks its own fixture copy, runs the build through the
//! harness, and then checks the per-class report against the expectation.
//! Assertions work on the parsed report tree, never on console text.

use std::path::Path;
use std::time::{Duration, Instant};

use colored::Colorize;
use futures_util::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::Instrument;

use crate::common::config::Config;
use crate::common::{Error, ErrorKind, Result};
use crate::harness::{Harness, Invocation, Workspace};
use crate::report::{self, ReportNode};

use super::config::{MatrixPlan, OutcomeExpectation, ReportTarget, ScenarioExpectation};

/// Element holding one test case in a per-class report
const TESTCASE_TAG: &str = "testcase";

/// Settings for one matrix run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Scenarios allowed to run at the same time
    pub jobs: usize,
    /// Goals used when the plan does not list its own
    pub goals: Vec<String>,
    /// Report-generation goal appended after the build goals
    pub report_goal: Option<String>,
    /// Encoding used when the plan does not name one
    pub encoding: String,
    /// Only run these versions (all when empty)
    pub versions: Vec<String>,
    /// Suppress per-scenario console lines
    pub quiet: bool,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            jobs: config.runner.jobs,
            goals: config.harness.goals.clone(),
            report_goal: config.harness.report_goal.clone(),
            encoding: config.runner.encoding.clone(),
            versions: Vec::new(),
            quiet: false,
        }
    }
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub version: String,
    pub outcome: &'static str,
    pub passed: bool,
    pub error_kind: Option<ErrorKind>,
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl ScenarioOutcome {
    fn new(scenario: &ScenarioExpectation, result: &Result<()>, elapsed: Duration) -> Self {
        Self {
            name: scenario.display_name(),
            version: scenario.version.clone(),
            outcome: scenario.expect.outcome.tag(),
            passed: result.is_ok(),
            error_kind: result.as_ref().err().map(Error::kind),
            error: result.as_ref().err().map(|e| e.to_string()),
            duration_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Result of a whole matrix plan, in plan order
#[derive(Debug, Clone, Serialize)]
pub struct MatrixReport {
    pub plan: String,
    pub outcomes: Vec<ScenarioOutcome>,
}

impl MatrixReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Run every selected scenario of `plan`
///
/// Scenarios are independent: a failing one is recorded and the rest keep
/// running. Errors are only returned for problems with the plan itself.
pub async fn run_matrix(
    harness: &dyn Harness,
    plan: &MatrixPlan,
    options: &RunOptions,
) -> Result<MatrixReport> {
    let selected: Vec<&ScenarioExpectation> = plan
        .scenarios
        .iter()
        .filter(|s| options.versions.is_empty() || options.versions.contains(&s.version))
        .collect();

    if selected.is_empty() {
        return Err(Error::Config(format!(
            "No scenarios in '{}' match versions {:?}",
            plan.name, options.versions
        )));
    }

    if !options.quiet {
        println!(
            "\n{} {}",
            "Running Matrix:".blue().bold(),
            plan.name.white().bold()
        );
        if let Some(desc) = &plan.description {
            println!("  {}", desc.dimmed());
        }
    }

    let progress = if options.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(selected.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("=> "),
        );
        pb
    };

    let jobs = options.jobs.max(1);
    let progress_ref = &progress;
    let outcomes: Vec<ScenarioOutcome> = stream::iter(selected)
        .map(|scenario| async move {
            let started = Instant::now();
            let span = tracing::info_span!("scenario", version = %scenario.version);
            let result = run_scenario(harness, plan, scenario, options)
                .instrument(span)
                .await;
            let outcome = ScenarioOutcome::new(scenario, &result, started.elapsed());

            if !options.quiet {
                progress_ref.suspend(|| print_outcome(&outcome));
            }
            progress_ref.inc(1);
            outcome
        })
        .buffered(jobs)
        .collect()
        .await;

    progress.finish_and_clear();

    let report = MatrixReport {
        plan: plan.name.clone(),
        outcomes,
    };

    if !options.quiet {
        if report.all_passed() {
            println!(
                "\n{} {}\n",
                "✓".green().bold(),
                format!("{} scenario(s) passed", report.passed()).green().bold()
            );
        } else {
            println!(
                "\n{} {}\n",
                "✗".red().bold(),
                format!("{} of {} scenario(s) failed", report.failed(), report.outcomes.len())
                    .red()
                    .bold()
            );
        }
    }

    Ok(report)
}

fn print_outcome(outcome: &ScenarioOutcome) {
    let elapsed = format!("({:.1}s)", outcome.duration_ms as f64 / 1000.0);
    match &outcome.error {
        None => println!(
            "  {} {} {}",
            "✓".green(),
            outcome.name,
            elapsed.dimmed()
        ),
        Some(error) => println!(
            "  {} {} {}\n      {}",
            "✗".red(),
            outcome.name,
            elapsed.dimmed(),
            error
        ),
    }
}

/// Run one scenario end to end
///
/// unpack → build → check summary → parse report → check report.
/// The workspace is removed on every exit path.
pub async fn run_scenario(
    harness: &dyn Harness,
    plan: &MatrixPlan,
    scenario: &ScenarioExpectation,
    options: &RunOptions,
) -> Result<()> {
    let expected = scenario.expect.outcome.expected_counts();

    let fixture = plan.fixture.clone();
    let workspace = tokio::task::spawn_blocking(move || Workspace::unpack(&fixture))
        .await
        .map_err(|e| Error::Internal(format!("Fixture copy task failed: {}", e)))??;

    let goals = plan.goals.as_ref().unwrap_or(&options.goals);
    let invocation = Invocation::new(plan.fixture_name(), &scenario.version)
        .with_goals(goals)
        .with_report_goal(options.report_goal.as_deref());

    let result = harness.execute(&workspace, &invocation).await?;
    result.assert_counts(expected)?;

    let target = plan.target(&options.encoding);
    let report_path = result.report_file(&target.class_name)?;
    check_report_file(&report_path, &target, &scenario.expect)?;

    tracing::debug!(version = %scenario.version, "scenario passed");
    Ok(())
}

/// Parse a report file and check it
pub fn check_report_file(
    path: &Path,
    target: &ReportTarget,
    expect: &OutcomeExpectation,
) -> Result<()> {
    let root = report::parse_file(path, &target.encoding)?;
    verify_report(&root, target, expect)
}

/// Check a parsed report: one test case for the target class, carrying
/// exactly one outcome element whose attributes match
pub fn verify_report(
    root: &ReportNode,
    target: &ReportTarget,
    expect: &OutcomeExpectation,
) -> Result<()> {
    let testcase = single(root.children(TESTCASE_TAG), TESTCASE_TAG)?;
    expect_attribute(testcase, "classname", Some(target.class_name.as_str()))?;
    if let Some(test_name) = &target.test_name {
        expect_attribute(testcase, "name", Some(test_name.as_str()))?;
    }

    let tag = expect.outcome.tag();
    let result = single(testcase.children(tag), tag)?;
    expect_attribute(result, "message", expect.message.as_deref())?;
    expect_attribute(result, "type", expect.type_name.as_deref())?;
    Ok(())
}

fn single<'a>(nodes: Vec<&'a ReportNode>, tag: &str) -> Result<&'a ReportNode> {
    match nodes.as_slice() {
        [only] => Ok(*only),
        _ => Err(Error::node_count(tag, 1, nodes.len())),
    }
}

/// Exact comparison; `None` requires the attribute to be absent
fn expect_attribute(node: &ReportNode, name: &str, expected: Option<&str>) -> Result<()> {
    let actual = node.attribute(name);
    if actual != expected {
        return Err(Error::attribute_mismatch(&node.tag, name, expected, actual));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::config::OutcomeKind;

    fn target() -> ReportTarget {
        ReportTarget {
            class_name: "testng.DataProviderExceptionReportTest".to_string(),
            test_name: Some("testDataProvider".to_string()),
            encoding: "UTF-8".to_string(),
        }
    }

    fn testcase(outcome: ReportNode) -> ReportNode {
        ReportNode::new("testcase")
            .with_attribute("name", "testDataProvider")
            .with_attribute("classname", "testng.DataProviderExceptionReportTest")
            .with_child(outcome)
    }

    fn suite(cases: Vec<ReportNode>) -> ReportNode {
        cases
            .into_iter()
            .fold(ReportNode::new("testsuite"), |s, c| s.with_child(c))
    }

    fn expect(outcome: OutcomeKind, message: Option<&str>, type_name: Option<&str>) -> OutcomeExpectation {
        OutcomeExpectation {
            outcome,
            message: message.map(str::to_string),
            type_name: type_name.map(str::to_string),
        }
    }

    #[test]
    fn test_matching_failure() {
        let root = suite(vec![testcase(
            ReportNode::new("failure")
                .with_attribute("message", "java.lang.reflect.InvocationTargetException")
                .with_attribute("type", "org.testng.TestNGException"),
        )]);
        verify_report(
            &root,
            &target(),
            &expect(
                OutcomeKind::Failure,
                Some("java.lang.reflect.InvocationTargetException"),
                Some("org.testng.TestNGException"),
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_absent_expectation_accepts_bare_element() {
        let root = suite(vec![testcase(ReportNode::new("skipped"))]);
        verify_report(&root, &target(), &expect(OutcomeKind::Skipped, None, None)).unwrap();
    }

    #[test]
    fn test_absent_expectation_rejects_empty_string() {
        let root = suite(vec![testcase(
            ReportNode::new("skipped").with_attribute("message", ""),
        )]);
        let err =
            verify_report(&root, &target(), &expect(OutcomeKind::Skipped, None, None)).unwrap_err();
        match err {
            Error::AttributeMismatch {
                attribute,
                expected,
                actual,
                ..
            } => {
                assert_eq!(attribute, "message");
                assert_eq!(expected, None);
                assert_eq!(actual.as_deref(), Some(""));
            }
            other => panic!("Expected AttributeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_comparison_is_exact() {
        let root = suite(vec![testcase(
            ReportNode::new("skipped")
                .with_attribute("message", "java.lang.RuntimeException ")
                .with_attribute("type", "java.lang.RuntimeException"),
        )]);
        let err = verify_report(
            &root,
            &target(),
            &expect(
                OutcomeKind::Skipped,
                Some("java.lang.RuntimeException"),
                Some("java.lang.RuntimeException"),
            ),
        )
        .unwrap_err();
        assert!(matches!(err, Error::AttributeMismatch { ref attribute, .. } if attribute == "message"));

        let root = suite(vec![testcase(
            ReportNode::new("skipped").with_attribute("type", "Java.Lang.RuntimeException"),
        )]);
        let err = verify_report(
            &root,
            &target(),
            &expect(OutcomeKind::Skipped, None, Some("java.lang.RuntimeException")),
        )
        .unwrap_err();
        assert!(matches!(err, Error::AttributeMismatch { ref attribute, .. } if attribute == "type"));
    }

    #[test]
    fn test_testcase_count() {
        let none = suite(vec![]);
        assert!(matches!(
            verify_report(&none, &target(), &expect(OutcomeKind::Skipped, None, None)),
            Err(Error::NodeCount { expected: 1, actual: 0, .. })
        ));

        let two = suite(vec![
            testcase(ReportNode::new("skipped")),
            testcase(ReportNode::new("skipped")),
        ]);
        assert!(matches!(
            verify_report(&two, &target(), &expect(OutcomeKind::Skipped, None, None)),
            Err(Error::NodeCount { expected: 1, actual: 2, .. })
        ));
    }

    #[test]
    fn test_wrong_outcome_element() {
        let root = suite(vec![testcase(ReportNode::new("skipped"))]);
        let err = verify_report(&root, &target(), &expect(OutcomeKind::Failure, None, None))
            .unwrap_err();
        assert!(matches!(err, Error::NodeCount { ref tag, actual: 0, .. } if tag == "failure"));
    }

    #[test]
    fn test_wrong_classname() {
        let root = suite(vec![ReportNode::new("testcase")
            .with_attribute("name", "testDataProvider")
            .with_attribute("classname", "testng.Other")
            .with_child(ReportNode::new("skipped"))]);
        let err = verify_report(&root, &target(), &expect(OutcomeKind::Skipped, None, None))
            .unwrap_err();
        assert!(matches!(err, Error::AttributeMismatch { ref attribute, .. } if attribute == "classname"));
    }

    #[test]
    fn test_test_name_optional() {
        let root = suite(vec![ReportNode::new("testcase")
            .with_attribute("name", "anything")
            .with_attribute("classname", "testng.DataProviderExceptionReportTest")
            .with_child(ReportNode::new("skipped"))]);
        let mut target = target();
        target.test_name = None;
        verify_report(&root, &target, &expect(OutcomeKind::Skipped, None, None)).unwrap();
    }

    #[test]
    fn test_check_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TEST-testng.DataProviderExceptionReportTest.xml");
        std::fs::write(
            &path,
            r#"<testsuite><testcase name="testDataProvider" classname="testng.DataProviderExceptionReportTest"><skipped/></testcase></testsuite>"#,
        )
        .unwrap();
        check_report_file(&path, &target(), &expect(OutcomeKind::Skipped, None, None)).unwrap();
    }
}
