//! The single failure type a sync run can produce.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stage-specific failure codes. Exactly one is reported per failed sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GitSyncErrorCode {
    // ── URL policy ───────────────────────────────────────────────────────────
    InvalidUrl,
    InvalidProtocol,
    InvalidPort,
    HostNotAllowed,
    SsrfBlocked,
    DnsResolutionFailed,
    // ── Transport ────────────────────────────────────────────────────────────
    CloneTimeout,
    CloneFailed,
    // ── Tree integrity ───────────────────────────────────────────────────────
    PathTraversal,
    AbsolutePath,
    PathTooLong,
    SymlinkDetected,
    // ── Manifest ─────────────────────────────────────────────────────────────
    NoManifest,
    ManifestValidationFailed,
    // ── Resource limits ──────────────────────────────────────────────────────
    FileTooLarge,
    TotalSizeExceeded,
    TooManyFiles,
}

impl GitSyncErrorCode {
    /// Every code, in pipeline order.
    pub const ALL: [Self; 17] = [
        Self::InvalidUrl,
        Self::InvalidProtocol,
        Self::InvalidPort,
        Self::HostNotAllowed,
        Self::SsrfBlocked,
        Self::DnsResolutionFailed,
        Self::CloneTimeout,
        Self::CloneFailed,
        Self::PathTraversal,
        Self::AbsolutePath,
        Self::PathTooLong,
        Self::SymlinkDetected,
        Self::NoManifest,
        Self::ManifestValidationFailed,
        Self::FileTooLarge,
        Self::TotalSizeExceeded,
        Self::TooManyFiles,
    ];

    /// Wire name of the code, e.g. `"SSRF_BLOCKED"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUrl => "INVALID_URL",
            Self::InvalidProtocol => "INVALID_PROTOCOL",
            Self::InvalidPort => "INVALID_PORT",
            Self::HostNotAllowed => "HOST_NOT_ALLOWED",
            Self::SsrfBlocked => "SSRF_BLOCKED",
            Self::DnsResolutionFailed => "DNS_RESOLUTION_FAILED",
            Self::CloneTimeout => "CLONE_TIMEOUT",
            Self::CloneFailed => "CLONE_FAILED",
            Self::PathTraversal => "PATH_TRAVERSAL",
            Self::AbsolutePath => "ABSOLUTE_PATH",
            Self::PathTooLong => "PATH_TOO_LONG",
            Self::SymlinkDetected => "SYMLINK_DETECTED",
            Self::NoManifest => "NO_MANIFEST",
            Self::ManifestValidationFailed => "MANIFEST_VALIDATION_FAILED",
            Self::FileTooLarge => "FILE_TOO_LARGE",
            Self::TotalSizeExceeded => "TOTAL_SIZE_EXCEEDED",
            Self::TooManyFiles => "TOO_MANY_FILES",
        }
    }
}

impl fmt::Display for GitSyncErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed sync: the code callers branch on plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct GitSyncError {
    pub code: GitSyncErrorCode,
    pub message: String,
}

impl GitSyncError {
    pub fn new(code: GitSyncErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
