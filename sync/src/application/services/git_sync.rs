//! The sync orchestrator.
//!
//! Runs every stage strictly in sequence over one ephemeral working
//! directory. The first failing stage ends the run with its own error,
//! unmodified. The working directory guard is held for the whole run, so
//! it is removed on success, on any stage error, and while unwinding from
//! a panic.

use construct_common::SyncResult;

use crate::application::ports::{Cloner, HostResolver, RepoReader, ScratchSpace};
use crate::application::services::url_validation::validate_source_url;
use crate::domain::SyncConfig;
use crate::domain::error::{SyncOutcome, clone_failed};
use crate::domain::manifest::manifest_version;

/// Checkout directory name inside the working directory.
pub const CHECKOUT_DIR: &str = "repo";

/// Construct sync pipeline: URL policy → clone → tree validation →
/// manifest → file collection → identity.
pub struct GitSync<C, H, F> {
    allowed_hosts: Vec<String>,
    cloner: C,
    resolver: H,
    repo: F,
}

impl<C, H, F> GitSync<C, H, F>
where
    C: Cloner,
    H: HostResolver,
    F: ScratchSpace + RepoReader,
{
    pub fn new(config: &SyncConfig, cloner: C, resolver: H, repo: F) -> Self {
        Self {
            allowed_hosts: config.allowed_hosts.clone(),
            cloner,
            resolver,
            repo,
        }
    }

    /// Ingest `git_ref` of the repository at `url`.
    ///
    /// There are no retries and no partial results: any failure discards
    /// the attempt and is returned as-is. Retry policy belongs to the caller.
    ///
    /// # Errors
    ///
    /// The single [`construct_common::GitSyncError`] raised by the first
    /// failing stage.
    pub async fn sync(&self, url: &str, git_ref: &str) -> SyncOutcome<SyncResult> {
        tracing::info!(url = %url, git_ref = %git_ref, "construct sync starting");

        let outcome = self.run(url, git_ref).await;
        match &outcome {
            Ok(result) => tracing::info!(
                commit = %result.commit,
                version = %result.version,
                files = result.files.len(),
                total_size_bytes = result.total_size_bytes,
                "construct sync complete",
            ),
            Err(err) => tracing::warn!(
                code = %err.code,
                message = %err.message,
                "construct sync failed",
            ),
        }
        outcome
    }

    async fn run(&self, url: &str, git_ref: &str) -> SyncOutcome<SyncResult> {
        // Dropping `_workdir_guard` removes the directory on every exit path.
        let (workdir, _workdir_guard) = self
            .repo
            .allocate()
            .map_err(|e| clone_failed(format!("could not create working directory: {e:#}")))?;

        let url = validate_source_url(url, &self.allowed_hosts, &self.resolver).await?;

        let checkout = workdir.join(CHECKOUT_DIR);
        tracing::debug!(dest = %checkout.display(), "cloning");
        let commit = self.cloner.clone_repo(url.as_str(), git_ref, &checkout).await?;

        tracing::debug!(commit = %commit, "validating tree");
        self.repo.validate_tree(&checkout).await?;

        tracing::debug!("reading manifest");
        let manifest = self.repo.read_manifest(&checkout).await?;

        tracing::debug!("collecting files");
        let files = self.repo.collect_files(&checkout).await?;

        tracing::debug!("reading identity");
        let identity = self.repo.read_identity(&checkout).await;

        let total_size_bytes = files.iter().map(|f| f.size_bytes).sum();
        Ok(SyncResult {
            version: manifest_version(&manifest),
            commit,
            manifest,
            files,
            identity,
            total_size_bytes,
        })
    }
}
