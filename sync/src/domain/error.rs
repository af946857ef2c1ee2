//! Error constructors for each pipeline stage.
//!
//! The error type itself lives in `construct-common` so consumers can relay
//! it without depending on this crate. Every stage fails with exactly one
//! `GitSyncError`; nothing here ever wraps or reinterprets another stage's
//! error.

pub use construct_common::{GitSyncError, GitSyncErrorCode};

/// Result alias used by every stage.
pub type SyncOutcome<T> = Result<T, GitSyncError>;

// ── URL policy ────────────────────────────────────────────────────────────────

pub fn invalid_url(detail: impl std::fmt::Display) -> GitSyncError {
    GitSyncError::new(GitSyncErrorCode::InvalidUrl, format!("Invalid URL: {detail}"))
}

pub fn invalid_protocol(scheme: &str) -> GitSyncError {
    GitSyncError::new(
        GitSyncErrorCode::InvalidProtocol,
        format!("Only https URLs are allowed, got '{scheme}'"),
    )
}

pub fn invalid_port(port: u16) -> GitSyncError {
    GitSyncError::new(
        GitSyncErrorCode::InvalidPort,
        format!("Non-default port {port} is not allowed"),
    )
}

pub fn host_not_allowed(host: &str) -> GitSyncError {
    GitSyncError::new(
        GitSyncErrorCode::HostNotAllowed,
        format!("Host '{host}' is not in the allow-list"),
    )
}

// ── Transport ─────────────────────────────────────────────────────────────────

pub fn clone_failed(detail: impl std::fmt::Display) -> GitSyncError {
    GitSyncError::new(GitSyncErrorCode::CloneFailed, format!("Clone failed: {detail}"))
}

// ── Resource limits ───────────────────────────────────────────────────────────

pub fn file_too_large(path: &str, size: u64, max: u64) -> GitSyncError {
    GitSyncError::new(
        GitSyncErrorCode::FileTooLarge,
        format!("File '{path}' is {size} bytes (max {max} bytes)"),
    )
}
