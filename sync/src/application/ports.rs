//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use thiserror::Error;

use crate::domain::SyncOutcome;
use construct_common::{CollectedFile, IdentityData};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Raised by a [`CommandRunner`] when the child outlived its timeout and
/// was killed.
#[derive(Debug, Error)]
#[error("{program} timed out after {}s", .timeout.as_secs())]
pub struct CommandTimedOut {
    pub program: String,
    pub timeout: Duration,
}

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// Programs are always invoked with an argument vector; there is no shell.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output, killing it if it outlives
    /// `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or waited on. On
    /// expiry the error is a `CommandTimedOut`, so callers can tell a
    /// timeout apart from any other failure.
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Clone Port ────────────────────────────────────────────────────────────────

/// Shallow checkout of a single ref.
#[allow(async_fn_in_trait)]
pub trait Cloner {
    /// Check out `git_ref` of `url` into `dest` and return the full commit id.
    ///
    /// Writes nothing outside `dest`.
    async fn clone_repo(&self, url: &str, git_ref: &str, dest: &Path) -> SyncOutcome<String>;
}

// ── DNS Port ──────────────────────────────────────────────────────────────────

/// Live hostname resolution.
#[allow(async_fn_in_trait)]
pub trait HostResolver {
    /// Resolve `host` to every address it currently answers with.
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>>;
}

// ── Filesystem Ports ──────────────────────────────────────────────────────────

/// Allocates the per-run ephemeral working directory.
pub trait ScratchSpace {
    /// Create a fresh, uniquely-named directory.
    ///
    /// Returns `(path, guard)` where `path` is the new directory and
    /// `guard` removes it (logging, never propagating, any failure) when
    /// dropped.
    fn allocate(&self) -> Result<(PathBuf, Box<dyn std::any::Any + Send>)>;
}

/// Read-side stages over a cloned tree.
///
/// `validate_tree` must complete before any other method reads content.
#[allow(async_fn_in_trait)]
pub trait RepoReader {
    /// Walk every entry (excluding `.git`) and reject unsafe ones.
    async fn validate_tree(&self, root: &Path) -> SyncOutcome<()>;
    /// Locate, parse and validate the manifest.
    async fn read_manifest(&self, root: &Path) -> SyncOutcome<Value>;
    /// Gather the allow-listed files under the configured ceilings.
    async fn collect_files(&self, root: &Path) -> SyncOutcome<Vec<CollectedFile>>;
    /// Best-effort identity extraction; never fails.
    async fn read_identity(&self, root: &Path) -> Option<IdentityData>;
}
