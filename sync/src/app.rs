//! Composition root: wires concrete infrastructure into [`GitSync`].

use anyhow::Result;
use construct_common::SyncResult;

use crate::application::services::git_sync::GitSync;
use crate::domain::SyncConfig;
use crate::domain::error::{SyncOutcome, clone_failed};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::git::GitCloner;
use crate::infra::manifest;
use crate::infra::repo::LocalRepo;
use crate::infra::resolver::TokioResolver;

/// The pipeline as deployed: real `git`, system DNS, local disk.
pub type ProductionSync = GitSync<GitCloner<TokioCommandRunner>, TokioResolver, LocalRepo>;

impl ProductionSync {
    /// Build the production pipeline from `config`.
    ///
    /// The manifest schema is loaded from `config.schema_path` the first
    /// time any pipeline is built in this process.
    #[must_use]
    pub fn production(config: &SyncConfig) -> Self {
        let cloner = GitCloner::new(
            TokioCommandRunner::new(),
            config.git_program.clone(),
            config.clone_timeout(),
        );
        let repo = LocalRepo::new(
            config.limits(),
            config.work_root.clone(),
            manifest::shared(&config.schema_path),
        );
        GitSync::new(config, cloner, TokioResolver, repo)
    }

    /// Build the production pipeline from `CONSTRUCT_SYNC_*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment holds an invalid configuration.
    pub fn from_env() -> Result<Self> {
        let config = SyncConfig::from_env()?;
        tracing::debug!(
            allowed_hosts = ?config.allowed_hosts,
            clone_timeout_secs = config.clone_timeout_secs,
            "sync config loaded",
        );
        Ok(Self::production(&config))
    }
}

/// Sync `git_ref` of `url` with configuration taken from the environment.
///
/// # Errors
///
/// The stage error of a failed sync. A configuration error is reported as
/// `CLONE_FAILED` since no clone can be attempted.
pub async fn sync_from_git(url: &str, git_ref: &str) -> SyncOutcome<SyncResult> {
    let pipeline = ProductionSync::from_env()
        .map_err(|e| clone_failed(format!("sync is misconfigured: {e:#}")))?;
    pipeline.sync(url, git_ref).await
}
