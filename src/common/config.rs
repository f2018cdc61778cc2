//! Configuration file handling

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// How the external build tool is invoked
    #[serde(default)]
    pub harness: HarnessConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Matrix runner settings
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Build tool invocation settings
#[derive(Debug, Deserialize, Clone)]
pub struct HarnessConfig {
    /// Executable name or path (looked up on PATH when not a path)
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Arguments placed before the version property and goals
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Goals that build and test the fixture
    #[serde(default = "default_goals")]
    pub goals: Vec<String>,

    /// Goal that renders the report; appended after `goals`
    #[serde(default = "default_report_goal")]
    pub report_goal: Option<String>,

    /// Build property receiving the framework version
    #[serde(default = "default_version_property")]
    pub version_property: String,

    /// Directory holding `TEST-*.xml`, relative to the fixture root
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// Extra environment for the build process
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            args: default_args(),
            goals: default_goals(),
            report_goal: default_report_goal(),
            version_property: default_version_property(),
            reports_dir: default_reports_dir(),
            env: HashMap::new(),
        }
    }
}

fn default_executable() -> String {
    "mvn".to_string()
}

fn default_args() -> Vec<String> {
    vec![
        "-B".to_string(),
        "-Dmaven.test.failure.ignore=true".to_string(),
    ]
}

fn default_goals() -> Vec<String> {
    vec!["clean".to_string(), "test".to_string()]
}

fn default_report_goal() -> Option<String> {
    Some("surefire-report:report".to_string())
}

fn default_version_property() -> String {
    "testng.version".to_string()
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("target").join("surefire-reports")
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize)]
pub struct Timeouts {
    /// Upper bound on a single build invocation
    #[serde(default = "default_harness_timeout")]
    pub harness_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            harness_secs: default_harness_timeout(),
        }
    }
}

fn default_harness_timeout() -> u64 {
    900
}

/// Matrix runner configuration
#[derive(Debug, Deserialize)]
pub struct RunnerConfig {
    /// Scenarios allowed to run at the same time
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Report encoding used when a plan does not name one
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            encoding: default_encoding(),
        }
    }
}

fn default_jobs() -> usize {
    1
}

fn default_encoding() -> String {
    "UTF-8".to_string()
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.runner.jobs == 0 {
            return Err(Error::Config("runner.jobs must be at least 1".to_string()));
        }
        if self.timeouts.harness_secs == 0 {
            return Err(Error::Config(
                "timeouts.harness_secs must be at least 1".to_string(),
            ));
        }
        if self.harness.executable.trim().is_empty() {
            return Err(Error::Config("harness.executable is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_surefire() {
        let config = Config::default();
        assert_eq!(config.harness.executable, "mvn");
        assert_eq!(config.harness.version_property, "testng.version");
        assert_eq!(
            config.harness.report_goal.as_deref(),
            Some("surefire-report:report")
        );
        assert_eq!(config.runner.jobs, 1);
        assert_eq!(config.timeouts.harness_secs, 900);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[harness]\nexecutable = \"./mvnw\"\n\n[runner]\njobs = 4\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.harness.executable, "./mvnw");
        assert_eq!(config.harness.goals, vec!["clean", "test"]);
        assert_eq!(config.runner.jobs, 4);
        assert_eq!(config.runner.encoding, "UTF-8");
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[runner]\njobs = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
