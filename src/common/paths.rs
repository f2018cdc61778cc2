//! Configuration and report paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/report-matrix/`
//! - macOS: `~/Library/Application Support/report-matrix/`
//! - Windows: `%APPDATA%\report-matrix\`

use std::path::{Path, PathBuf};

/// Name used for the configuration directory
const APP_NAME: &str = "report-matrix";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// File name of the per-class XML report: `TEST-<class>.xml`
pub fn report_file_name(class_name: &str) -> String {
    format!("TEST-{}.xml", class_name)
}

/// Resolve `path` against `base` unless it is already absolute
pub fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_toml() {
        if let Some(path) = config_path() {
            assert!(path.ends_with("config.toml"));
        }
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name("testng.DataProviderExceptionReportTest"),
            "TEST-testng.DataProviderExceptionReportTest.xml"
        );
    }

    #[test]
    fn test_resolve_relative() {
        let base = Path::new("/plans");
        assert_eq!(
            resolve_relative(base, Path::new("fixture")),
            PathBuf::from("/plans/fixture")
        );
        assert_eq!(
            resolve_relative(base, Path::new("/abs/fixture")),
            PathBuf::from("/abs/fixture")
        );
    }
}
