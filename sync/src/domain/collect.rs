//! File-collection policy: what gets collected, the ceilings it must stay
//! under, and how each file is turned into a [`CollectedFile`] record.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

use crate::domain::error::{GitSyncError, GitSyncErrorCode, SyncOutcome, file_too_large};
use crate::domain::manifest::{FALLBACK_MANIFEST, PRIMARY_MANIFEST};
use construct_common::CollectedFile;

/// Files picked up from the repository root when present. Missing ones are
/// skipped silently.
pub const ROOT_FILES: &[&str] = &[
    PRIMARY_MANIFEST,
    FALLBACK_MANIFEST,
    "README.md",
    "LICENSE",
    "CHANGELOG.md",
];

/// Top-level directories walked recursively. Nothing outside these and
/// [`ROOT_FILES`] is ever read.
pub const COLLECT_DIRS: &[&str] = &[
    "skills",
    "commands",
    "contexts",
    "identity",
    "scripts",
    "templates",
    "schemas",
    "resources",
];

/// MIME type reported for unknown or missing extensions.
pub const DEFAULT_MIME_TYPE: &str = "text/plain";

/// Hard ceilings applied while collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectLimits {
    pub max_file_bytes: u64,
    pub max_total_bytes: u64,
    pub max_files: usize,
    pub max_path_len: usize,
}

/// Running tally of what has been admitted so far.
///
/// Every file must pass [`CollectBudget::admit`] before its content is
/// read, so a hostile tree can never exceed a ceiling, even transiently.
#[derive(Debug, Clone)]
pub struct CollectBudget {
    limits: CollectLimits,
    total_bytes: u64,
    files: usize,
}

impl CollectBudget {
    #[must_use]
    pub fn new(limits: CollectLimits) -> Self {
        Self {
            limits,
            total_bytes: 0,
            files: 0,
        }
    }

    /// Account for one more file of `size` bytes.
    ///
    /// # Errors
    ///
    /// `FILE_TOO_LARGE`, `TOTAL_SIZE_EXCEEDED` or `TOO_MANY_FILES`. The
    /// budget is left unchanged on error.
    pub fn admit(&mut self, path: &str, size: u64) -> SyncOutcome<()> {
        if size > self.limits.max_file_bytes {
            return Err(file_too_large(path, size, self.limits.max_file_bytes));
        }

        let total = self.total_bytes.saturating_add(size);
        if total > self.limits.max_total_bytes {
            return Err(GitSyncError::new(
                GitSyncErrorCode::TotalSizeExceeded,
                format!(
                    "Total size would reach {total} bytes at '{path}' (max {} bytes)",
                    self.limits.max_total_bytes
                ),
            ));
        }

        if self.files >= self.limits.max_files {
            return Err(GitSyncError::new(
                GitSyncErrorCode::TooManyFiles,
                format!(
                    "More than {} files to collect (at '{path}')",
                    self.limits.max_files
                ),
            ));
        }

        self.total_bytes = total;
        self.files += 1;
        Ok(())
    }

    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    #[must_use]
    pub fn files(&self) -> usize {
        self.files
    }

    #[must_use]
    pub fn limits(&self) -> CollectLimits {
        self.limits
    }
}

/// Static extension lookup; case-insensitive.
#[must_use]
pub fn mime_type_for(path: &str) -> &'static str {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let Some((stem, ext)) = file_name.rsplit_once('.') else {
        return DEFAULT_MIME_TYPE;
    };
    if stem.is_empty() {
        // Dotfiles such as `.gitignore` have no extension.
        return DEFAULT_MIME_TYPE;
    }
    match ext.to_ascii_lowercase().as_str() {
        "md" => "text/markdown",
        "yaml" | "yml" => "application/yaml",
        "json" => "application/json",
        "sh" => "application/x-sh",
        "py" => "text/x-python",
        "js" | "mjs" => "application/javascript",
        "ts" => "application/typescript",
        "toml" => "application/toml",
        "html" => "text/html",
        "css" => "text/css",
        _ => DEFAULT_MIME_TYPE,
    }
}

/// Lowercase hex encoding.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(HEX[(b >> 4) as usize]));
        out.push(char::from(HEX[(b & 0xf) as usize]));
    }
    out
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    hex_encode(&Sha256::digest(bytes))
}

/// Build the stored record for one admitted file.
#[must_use]
pub fn build_record(path: &str, bytes: &[u8]) -> CollectedFile {
    CollectedFile {
        path: path.to_string(),
        content: STANDARD.encode(bytes),
        content_hash: content_hash(bytes),
        size_bytes: bytes.len() as u64,
        mime_type: mime_type_for(path).to_string(),
    }
}
