//! Deployment configuration for the sync pipeline.
//!
//! Per-call input is only `(url, ref)`; everything here is fixed for the
//! lifetime of a [`crate::GitSync`]. Loading from the environment lives in
//! `crate::infra::config`.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::collect::CollectLimits;

/// Hosts repositories may be cloned from (phase 1: GitHub only).
pub const DEFAULT_ALLOWED_HOSTS: &[&str] = &["github.com"];
pub const DEFAULT_CLONE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;
pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_FILES: usize = 500;
pub const DEFAULT_MAX_PATH_LEN: usize = 255;
pub const DEFAULT_SCHEMA_PATH: &str = "schemas/construct.schema.json";

/// Sync pipeline configuration.
///
/// Each field maps to `CONSTRUCT_SYNC_<FIELD>` when loaded via
/// [`SyncConfig::from_env`]; absent variables fall back to the defaults above.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncConfig {
    /// Exact hostnames clone URLs may point at.
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,

    /// Hard wall-clock limit for `git clone`.
    #[serde(default = "default_clone_timeout_secs")]
    pub clone_timeout_secs: u64,

    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: u64,

    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Longest relative path (in characters) tolerated in the cloned tree.
    #[serde(default = "default_max_path_len")]
    pub max_path_len: usize,

    /// Compiled manifest JSON schema. Optional at runtime: when the file is
    /// missing, manifests are checked for essential fields only.
    #[serde(default = "default_schema_path")]
    pub schema_path: PathBuf,

    /// Parent directory for ephemeral work directories (system temp dir
    /// when unset).
    #[serde(default)]
    pub work_root: Option<PathBuf>,

    #[serde(default = "default_git_program")]
    pub git_program: String,
}

fn default_allowed_hosts() -> Vec<String> {
    DEFAULT_ALLOWED_HOSTS.iter().map(ToString::to_string).collect()
}

fn default_clone_timeout_secs() -> u64 {
    DEFAULT_CLONE_TIMEOUT_SECS
}

fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_FILE_BYTES
}

fn default_max_total_bytes() -> u64 {
    DEFAULT_MAX_TOTAL_BYTES
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

fn default_max_path_len() -> usize {
    DEFAULT_MAX_PATH_LEN
}

fn default_schema_path() -> PathBuf {
    PathBuf::from(DEFAULT_SCHEMA_PATH)
}

fn default_git_program() -> String {
    "git".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: default_allowed_hosts(),
            clone_timeout_secs: default_clone_timeout_secs(),
            max_file_bytes: default_max_file_bytes(),
            max_total_bytes: default_max_total_bytes(),
            max_files: default_max_files(),
            max_path_len: default_max_path_len(),
            schema_path: default_schema_path(),
            work_root: None,
            git_program: default_git_program(),
        }
    }
}

impl SyncConfig {
    #[must_use]
    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_timeout_secs)
    }

    #[must_use]
    pub fn limits(&self) -> CollectLimits {
        CollectLimits {
            max_file_bytes: self.max_file_bytes,
            max_total_bytes: self.max_total_bytes,
            max_files: self.max_files,
            max_path_len: self.max_path_len,
        }
    }

    /// Rejects configurations that would make every sync fail or every
    /// limit meaningless.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.allowed_hosts.iter().all(|h| h.trim().is_empty()) {
            return Err("allowed_hosts must name at least one host".to_string());
        }
        if self.clone_timeout_secs == 0 {
            return Err("clone_timeout_secs must be greater than zero".to_string());
        }
        if self.max_files == 0 || self.max_file_bytes == 0 || self.max_total_bytes == 0 {
            return Err("collection limits must be greater than zero".to_string());
        }
        if self.max_path_len == 0 {
            return Err("max_path_len must be greater than zero".to_string());
        }
        Ok(())
    }
}
