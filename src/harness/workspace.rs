//! Scoped fixture workspaces
//!
//! Every scenario gets a fresh copy of its fixture project inside a
//! temporary directory. The directory is removed when the [`Workspace`] is
//! dropped, whichever way the scenario ended.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

use crate::common::{Error, Result};

/// Build output directory skipped when copying a fixture
const BUILD_OUTPUT_DIR: &str = "target";

/// A private copy of a fixture project
#[derive(Debug)]
pub struct Workspace {
    // Held for its Drop
    _dir: TempDir,
    root: PathBuf,
}

impl Workspace {
    /// Copy `fixture` into a new temporary directory
    pub fn unpack(fixture: &Path) -> Result<Self> {
        if !fixture.is_dir() {
            return Err(Error::Config(format!(
                "Fixture project not found: {}",
                fixture.display()
            )));
        }

        let dir = tempfile::Builder::new()
            .prefix("report-matrix-")
            .tempdir()?;
        let name = fixture
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "fixture".into());
        let root = dir.path().join(name);

        let walker = WalkDir::new(fixture)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !(e.depth() == 1 && e.file_name() == BUILD_OUTPUT_DIR));

        let mut files = 0usize;
        for entry in walker {
            let entry = entry.map_err(|e| {
                Error::Internal(format!("Failed to walk fixture {}: {}", fixture.display(), e))
            })?;
            let relative = entry
                .path()
                .strip_prefix(fixture)
                .map_err(|e| Error::Internal(e.to_string()))?;
            let target = root.join(relative);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target)?;
            } else {
                std::fs::copy(entry.path(), &target)?;
                files += 1;
            }
        }

        tracing::debug!(
            fixture = %fixture.display(),
            workspace = %root.display(),
            files,
            "unpacked fixture"
        );

        Ok(Self { _dir: dir, root })
    }

    /// Root of the copied project
    pub fn path(&self) -> &Path {
        &self.root
    }
}
