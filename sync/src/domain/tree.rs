//! Per-entry rules for a cloned tree.
//!
//! The walk itself is infrastructure; this module only judges one entry at
//! a time, given its path relative to the repository root.

use crate::domain::error::{GitSyncError, GitSyncErrorCode, SyncOutcome};

/// Version-control metadata directory, skipped by every walk.
pub const VCS_DIR: &str = ".git";

/// Judge a single tree entry. Checks run in order and the first failure
/// wins: traversal, absolute path, length, symlink.
///
/// # Errors
///
/// `PATH_TRAVERSAL`, `ABSOLUTE_PATH`, `PATH_TOO_LONG` or `SYMLINK_DETECTED`.
pub fn check_entry(relative: &str, is_symlink: bool, max_path_len: usize) -> SyncOutcome<()> {
    if has_parent_segment(relative) {
        return Err(GitSyncError::new(
            GitSyncErrorCode::PathTraversal,
            format!("Path traversal detected: {relative}"),
        ));
    }

    if is_absolute(relative) {
        return Err(GitSyncError::new(
            GitSyncErrorCode::AbsolutePath,
            format!("Absolute path detected: {relative}"),
        ));
    }

    let len = relative.chars().count();
    if len > max_path_len {
        return Err(GitSyncError::new(
            GitSyncErrorCode::PathTooLong,
            format!("Path is {len} characters (max {max_path_len}): {relative}"),
        ));
    }

    if is_symlink {
        return Err(GitSyncError::new(
            GitSyncErrorCode::SymlinkDetected,
            format!("Symlink detected: {relative}"),
        ));
    }

    Ok(())
}

/// True if any `/`- or `\`-separated segment is `..`.
#[must_use]
pub fn has_parent_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "..")
}

fn is_absolute(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') {
        return true;
    }
    // Windows drive root, e.g. `C:\` or `c:/`. A bare `a:notes.md` is an
    // ordinary file name.
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'/' | b'\\')
}

/// Whether `relative` (a `/`-joined path) lies inside the version-control
/// metadata directory.
#[must_use]
pub fn is_vcs_path(relative: &str) -> bool {
    relative == VCS_DIR || relative.starts_with(".git/")
}
