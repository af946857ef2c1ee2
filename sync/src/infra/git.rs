//! Git implementation of the `Cloner` port.
//!
//! Runs `git` through a `CommandRunner` with an argument vector, never a
//! shell string, so neither the URL nor the ref can inject commands.

use std::path::Path;
use std::time::Duration;

use crate::application::ports::{Cloner, CommandRunner, CommandTimedOut};
use crate::domain::error::{GitSyncError, GitSyncErrorCode, SyncOutcome, clone_failed};
use crate::domain::git_ref::{is_commit_id, validate_ref};

/// Timeout for the local `rev-parse` after a successful clone.
pub const REV_PARSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment for every git invocation: no prompts, no LFS downloads,
/// no user or system config (which could rewrite the remote URL).
pub const GIT_ENV: &[(&str, &str)] = &[
    ("GIT_TERMINAL_PROMPT", "0"),
    ("GIT_ASKPASS", ""),
    ("GIT_LFS_SKIP_SMUDGE", "1"),
    ("GIT_CONFIG_NOSYSTEM", "1"),
    ("GIT_CONFIG_GLOBAL", "/dev/null"),
];

/// Shallow, single-branch cloner.
pub struct GitCloner<R> {
    runner: R,
    program: String,
    timeout: Duration,
}

impl<R: CommandRunner> GitCloner<R> {
    pub fn new(runner: R, program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runner,
            program: program.into(),
            timeout,
        }
    }
}

/// Arguments for the shallow clone.
#[must_use]
pub fn clone_args<'a>(url: &'a str, git_ref: &'a str, dest: &'a str) -> Vec<&'a str> {
    vec![
        "-c",
        "credential.helper=",
        "-c",
        "protocol.file.allow=never",
        "clone",
        "--depth",
        "1",
        "--single-branch",
        "--no-tags",
        "--branch",
        git_ref,
        "--",
        url,
        dest,
    ]
}

impl<R: CommandRunner> Cloner for GitCloner<R> {
    async fn clone_repo(&self, url: &str, git_ref: &str, dest: &Path) -> SyncOutcome<String> {
        validate_ref(git_ref)?;
        let dest_str = dest
            .to_str()
            .ok_or_else(|| clone_failed(format!("non-UTF-8 destination {}", dest.display())))?;

        let out = self
            .runner
            .run_with_timeout(
                &self.program,
                &clone_args(url, git_ref, dest_str),
                GIT_ENV,
                self.timeout,
            )
            .await
            .map_err(|e| {
                if e.downcast_ref::<CommandTimedOut>().is_some() {
                    GitSyncError::new(
                        GitSyncErrorCode::CloneTimeout,
                        format!("Clone timed out after {}s: {e}", self.timeout.as_secs()),
                    )
                } else {
                    clone_failed(format!("{e:#}"))
                }
            })?;
        if !out.status.success() {
            return Err(clone_failed(String::from_utf8_lossy(&out.stderr).trim()));
        }

        let out = self
            .runner
            .run_with_timeout(
                &self.program,
                &["-C", dest_str, "rev-parse", "HEAD"],
                GIT_ENV,
                REV_PARSE_TIMEOUT,
            )
            .await
            .map_err(|e| clone_failed(format!("resolving commit: {e:#}")))?;
        if !out.status.success() {
            return Err(clone_failed(format!(
                "resolving commit: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let commit = String::from_utf8_lossy(&out.stdout).trim().to_string();
        if !is_commit_id(&commit) {
            return Err(clone_failed(format!("unexpected commit id '{commit}'")));
        }
        tracing::debug!(commit = %commit, "clone complete");
        Ok(commit)
    }
}
