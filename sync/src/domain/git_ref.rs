//! Ref and commit-id rules for the clone stage.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::error::{SyncOutcome, clone_failed};

/// Branch or tag names accepted for `git clone --branch`. A leading `-`
/// is impossible by construction, so a ref can never be read as an option.
pub static GIT_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: this is a compile-time constant pattern, cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._/-]{0,254}$").expect("valid regex")
});

/// Full SHA-1 or SHA-256 object id as printed by `git rev-parse`.
pub static COMMIT_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(?:[0-9a-f]{40}|[0-9a-f]{64})$").expect("valid regex")
});

/// Reject refs that git would not accept as a branch name, or that could
/// be confused with a command-line option.
///
/// # Errors
///
/// `CLONE_FAILED` naming the rejected ref.
pub fn validate_ref(git_ref: &str) -> SyncOutcome<()> {
    let ok = GIT_REF_RE.is_match(git_ref)
        && !git_ref.contains("..")
        && !git_ref.contains("//")
        && !git_ref.ends_with('/')
        && !git_ref.ends_with(".lock");
    if ok {
        Ok(())
    } else {
        Err(clone_failed(format!("invalid ref '{git_ref}'")))
    }
}

#[must_use]
pub fn is_commit_id(candidate: &str) -> bool {
    COMMIT_ID_RE.is_match(candidate)
}
