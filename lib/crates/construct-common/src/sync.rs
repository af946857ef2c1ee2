//! Successful sync output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::IdentityData;

/// One file captured from the cloned repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedFile {
    /// Path relative to the repository root, `/`-separated, never traversing.
    pub path: String,
    /// Base64 (standard alphabet) of the raw file bytes.
    pub content: String,
    /// Lowercase hex SHA-256 of the raw file bytes.
    pub content_hash: String,
    /// Raw (pre-encoding) size in bytes.
    pub size_bytes: u64,
    pub mime_type: String,
}

/// Snapshot of a construct at one commit, ready for storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    /// Version declared by the manifest.
    pub version: String,
    /// Full commit id the snapshot was taken at.
    pub commit: String,
    /// The parsed manifest document.
    pub manifest: Value,
    pub files: Vec<CollectedFile>,
    pub identity: Option<IdentityData>,
    /// Sum of `size_bytes` over `files`.
    pub total_size_bytes: u64,
}

impl SyncResult {
    /// Looks up a collected file by its relative path.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&CollectedFile> {
        self.files.iter().find(|f| f.path == path)
    }
}
