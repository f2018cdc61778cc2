//! Matrix plan configuration types
//!
//! Defines the data structures for deserializing YAML matrix plans.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::common::{paths, Error, Result};
use crate::harness::SuiteCounts;

/// Which outcome element a test case is expected to carry
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Test reported as skipped (`<skipped>`)
    Skipped,
    /// Test reported as failed (`<failure>`)
    Failure,
}

impl OutcomeKind {
    /// Report element carrying this outcome
    pub fn tag(self) -> &'static str {
        match self {
            OutcomeKind::Skipped => "skipped",
            OutcomeKind::Failure => "failure",
        }
    }

    /// Build summary for a run of a single test with this outcome
    pub fn expected_counts(self) -> SuiteCounts {
        match self {
            OutcomeKind::Skipped => SuiteCounts::new(1, 0, 0, 1),
            OutcomeKind::Failure => SuiteCounts::new(1, 0, 1, 0),
        }
    }
}

/// Expected outcome element and its attributes
///
/// `None` means the attribute must be absent, not empty.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OutcomeExpectation {
    pub outcome: OutcomeKind,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
}

/// One framework version and what its report must say
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioExpectation {
    /// Display name; defaults to `<version>-<outcome>`
    pub name: Option<String>,
    /// Framework version handed to the build
    pub version: String,
    #[serde(flatten)]
    pub expect: OutcomeExpectation,
}

impl ScenarioExpectation {
    pub fn new(
        version: impl Into<String>,
        outcome: OutcomeKind,
        message: Option<&str>,
        type_name: Option<&str>,
    ) -> Self {
        Self {
            name: None,
            version: version.into(),
            expect: OutcomeExpectation {
                outcome,
                message: message.map(str::to_string),
                type_name: type_name.map(str::to_string),
            },
        }
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}-{}", self.version, self.expect.outcome.tag()))
    }
}

/// A complete matrix plan loaded from a YAML file
#[derive(Deserialize, Debug, Clone)]
pub struct MatrixPlan {
    /// Name of the plan
    pub name: String,
    /// Optional description of what the plan verifies
    pub description: Option<String>,
    /// Fixture project directory (relative to the plan file)
    pub fixture: PathBuf,
    /// Fully qualified test class whose report is checked
    pub class_name: String,
    /// Expected `name` attribute of the test case
    pub test_name: Option<String>,
    /// Report encoding; falls back to the configured default
    pub encoding: Option<String>,
    /// Build goals; fall back to the configured goals
    pub goals: Option<Vec<String>>,
    /// One entry per framework version
    pub scenarios: Vec<ScenarioExpectation>,
}

/// What identifies the report entry under test
#[derive(Debug, Clone)]
pub struct ReportTarget {
    pub class_name: String,
    pub test_name: Option<String>,
    pub encoding: String,
}

impl MatrixPlan {
    /// Load a plan, resolving the fixture against the plan's directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read matrix plan '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut plan = Self::from_yaml(&content)?;
        let plan_dir = path.parent().unwrap_or(Path::new("."));
        plan.fixture = paths::resolve_relative(plan_dir, &plan.fixture);
        Ok(plan)
    }

    /// Parse and validate plan YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        let plan: Self = serde_yaml::from_str(content)?;
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> Result<()> {
        if self.class_name.trim().is_empty() {
            return Err(Error::Config("class_name must not be empty".to_string()));
        }
        if self.scenarios.is_empty() {
            return Err(Error::Config(format!(
                "Plan '{}' has no scenarios",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            if scenario.version.trim().is_empty() {
                return Err(Error::Config("Scenario with empty version".to_string()));
            }
            let name = scenario.display_name();
            if !seen.insert(name.clone()) {
                return Err(Error::Config(format!("Duplicate scenario '{}'", name)));
            }
        }
        Ok(())
    }

    /// Fixture directory name, used to label invocations
    pub fn fixture_name(&self) -> String {
        self.fixture
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.fixture.display().to_string())
    }

    pub fn target(&self, default_encoding: &str) -> ReportTarget {
        ReportTarget {
            class_name: self.class_name.clone(),
            test_name: self.test_name.clone(),
            encoding: self
                .encoding
                .clone()
                .unwrap_or_else(|| default_encoding.to_string()),
        }
    }
}
