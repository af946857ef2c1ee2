//! Ephemeral working directory with guaranteed removal.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Prefix of every working directory; the rest of the name is random.
pub const WORKDIR_PREFIX: &str = "construct-sync-";

/// Owns one uniquely-named working directory and removes it on drop.
///
/// Removal failures are logged at warn level and otherwise ignored: they
/// must never change the outcome of the sync that owned the directory.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl WorkDir {
    /// Create a fresh directory under `parent`, or under the system temp
    /// directory when `parent` is `None`.
    pub fn create(parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKDIR_PREFIX);
        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating work root {}", parent.display()))?;
                builder.tempdir_in(parent)
            }
            None => builder.tempdir(),
        }
        .context("creating working directory")?;

        let path = dir.path().to_path_buf();
        tracing::debug!(workdir = %path.display(), "working directory created");
        Ok(Self {
            path,
            dir: Some(dir),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        match dir.close() {
            Ok(()) => tracing::debug!(workdir = %self.path.display(), "working directory removed"),
            Err(e) => tracing::warn!(
                workdir = %self.path.display(),
                error = %e,
                "failed to remove working directory",
            ),
        }
    }
}
