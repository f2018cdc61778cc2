//! Build tool driven as a child process
//!
//! Runs `<executable> <args…> -D<property>=<version> <goals…>` inside the
//! workspace, waits for it under a timeout, and reads the test summary from
//! the combined console output.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::{reports_dir_in, ExecutionResult, Harness, Invocation, SuiteCounts, Workspace};
use crate::common::config::HarnessConfig;
use crate::common::{Error, Result};

/// Lines of build output kept in error messages
const OUTPUT_TAIL_LINES: usize = 30;

/// Harness that shells out to a build tool such as Maven
#[derive(Debug, Clone)]
pub struct ProcessHarness {
    executable: PathBuf,
    args: Vec<String>,
    version_property: String,
    reports_dir: PathBuf,
    env: HashMap<String, String>,
    timeout_secs: u64,
}

impl ProcessHarness {
    /// Build from configuration, resolving the executable
    ///
    /// Bare names are looked up on PATH. Anything containing a path
    /// separator (e.g. `./mvnw`) is kept as given and, when relative,
    /// resolved against each workspace at run time.
    pub fn from_config(config: &HarnessConfig, timeout_secs: u64) -> Result<Self> {
        let executable = if config.executable.contains(&['/', '\\'][..]) {
            PathBuf::from(&config.executable)
        } else {
            which::which(&config.executable)
                .map_err(|_| Error::HarnessNotFound(config.executable.clone()))?
        };

        Ok(Self {
            executable,
            args: config.args.clone(),
            version_property: config.version_property.clone(),
            reports_dir: config.reports_dir.clone(),
            env: config.env.clone(),
            timeout_secs,
        })
    }

    /// Full argument list for an invocation
    fn command_args(&self, invocation: &Invocation) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(format!("-D{}={}", self.version_property, invocation.version));
        args.extend(invocation.goals.iter().cloned());
        args
    }
}

#[async_trait]
impl Harness for ProcessHarness {
    async fn execute(
        &self,
        workspace: &Workspace,
        invocation: &Invocation,
    ) -> Result<ExecutionResult> {
        let executable = if self.executable.is_relative() {
            workspace.path().join(&self.executable)
        } else {
            self.executable.clone()
        };
        let args = self.command_args(invocation);

        tracing::info!(
            fixture = %invocation.fixture,
            version = %invocation.version,
            "running {} {}",
            executable.display(),
            args.join(" ")
        );

        let child = Command::new(&executable)
            .args(&args)
            .current_dir(workspace.path())
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::HarnessExecution(format!(
                    "Failed to start '{}': {}",
                    executable.display(),
                    e
                ))
            })?;

        // Dropping the wait future on timeout kills the child
        let output = match timeout(Duration::from_secs(self.timeout_secs), child.wait_with_output())
            .await
        {
            Ok(result) => result.map_err(|e| {
                Error::HarnessExecution(format!("Failed waiting for build: {}", e))
            })?,
            Err(_) => return Err(Error::Timeout(self.timeout_secs)),
        };

        let mut console = String::from_utf8_lossy(&output.stdout).into_owned();
        console.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(Error::HarnessExecution(format!(
                "build exited with {}\n{}",
                output.status,
                tail(&console, OUTPUT_TAIL_LINES)
            )));
        }

        let counts = parse_summary(&console).ok_or_else(|| {
            Error::HarnessExecution(format!(
                "no test summary in build output\n{}",
                tail(&console, OUTPUT_TAIL_LINES)
            ))
        })?;

        tracing::debug!(version = %invocation.version, %counts, "build finished");

        Ok(ExecutionResult {
            counts,
            reports_dir: reports_dir_in(workspace.path(), &self.reports_dir),
        })
    }
}

fn summary_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Tests run:\s*(\d+),\s*Failures:\s*(\d+),\s*Errors:\s*(\d+),\s*Skipped:\s*(\d+)")
            .unwrap()
    })
}

/// Last `Tests run: …, Failures: …, Errors: …, Skipped: …` line in `output`
///
/// The build prints one line per test class and then the aggregate, so the
/// last match is the total.
pub fn parse_summary(output: &str) -> Option<SuiteCounts> {
    let caps = summary_pattern().captures_iter(output).last()?;
    let field = |i: usize| caps[i].parse::<u32>().ok();
    Some(SuiteCounts {
        total: field(1)?,
        failures: field(2)?,
        errors: field(3)?,
        skipped: field(4)?,
    })
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}
