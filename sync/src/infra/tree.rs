//! Tree validation walk.
//!
//! Visits every entry under the checkout with symlink-aware metadata
//! (symlinks are reported, never followed or descended into) and applies
//! [`check_entry`] to each. Fails fast on the first violation.

use std::path::Path;

use walkdir::WalkDir;

use crate::domain::error::{SyncOutcome, clone_failed};
use crate::domain::tree::{VCS_DIR, check_entry};
use crate::infra::fs::relative_slash_path;

/// Validate the whole tree rooted at `root`. Reads no file content.
///
/// # Errors
///
/// The first `PATH_TRAVERSAL`, `ABSOLUTE_PATH`, `PATH_TOO_LONG` or
/// `SYMLINK_DETECTED` violation, or `CLONE_FAILED` if the tree cannot be
/// walked.
pub fn validate_tree(root: &Path, max_path_len: usize) -> SyncOutcome<()> {
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.depth() == 1 && e.file_name() == VCS_DIR));

    let mut entries = 0usize;
    for entry in walker {
        let entry = entry.map_err(|e| clone_failed(format!("unreadable checkout entry: {e}")))?;
        let relative = relative_slash_path(root, entry.path()).ok_or_else(|| {
            clone_failed(format!("entry outside checkout: {}", entry.path().display()))
        })?;
        check_entry(&relative, entry.path_is_symlink(), max_path_len)?;
        entries += 1;
    }

    tracing::debug!(entries, "tree validated");
    Ok(())
}
