//! Bounded file collection.
//!
//! Two passes: a fixed list of root files, then a recursive walk of each
//! allow-listed directory. Every file is admitted against the running
//! budget using its metadata size *before* its content is read.

use std::path::Path;

use walkdir::WalkDir;

use crate::domain::collect::{COLLECT_DIRS, CollectBudget, CollectLimits, ROOT_FILES, build_record};
use crate::domain::error::{SyncOutcome, clone_failed, file_too_large};
use crate::infra::fs::{BoundedRead, read_bounded, relative_slash_path};
use construct_common::CollectedFile;

/// Collect the allow-listed subset of the tree at `root`.
///
/// Output order is root files (in [`ROOT_FILES`] order) followed by each
/// directory of [`COLLECT_DIRS`] in file-name order.
///
/// # Errors
///
/// `FILE_TOO_LARGE`, `TOTAL_SIZE_EXCEEDED` or `TOO_MANY_FILES` at the first
/// file that would break a ceiling; `CLONE_FAILED` if the checkout cannot
/// be read.
pub fn collect_files(root: &Path, limits: CollectLimits) -> SyncOutcome<Vec<CollectedFile>> {
    let mut budget = CollectBudget::new(limits);
    let mut files = Vec::new();

    for name in ROOT_FILES {
        let path = root.join(name);
        let Ok(meta) = path.symlink_metadata() else {
            continue;
        };
        if meta.file_type().is_file() {
            collect_one(&path, name, meta.len(), &mut budget, &mut files)?;
        }
    }

    for dir in COLLECT_DIRS {
        let base = root.join(dir);
        match base.symlink_metadata() {
            Ok(meta) if meta.file_type().is_dir() => {}
            _ => continue,
        }

        for entry in WalkDir::new(&base).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| clone_failed(format!("unreadable checkout entry: {e}")))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = relative_slash_path(root, entry.path()).ok_or_else(|| {
                clone_failed(format!("entry outside checkout: {}", entry.path().display()))
            })?;
            let size = entry
                .metadata()
                .map_err(|e| clone_failed(format!("stat {relative}: {e}")))?
                .len();
            collect_one(entry.path(), &relative, size, &mut budget, &mut files)?;
        }
    }

    tracing::debug!(
        files = budget.files(),
        total_bytes = budget.total_bytes(),
        "files collected"
    );
    Ok(files)
}

fn collect_one(
    path: &Path,
    relative: &str,
    size: u64,
    budget: &mut CollectBudget,
    files: &mut Vec<CollectedFile>,
) -> SyncOutcome<()> {
    budget.admit(relative, size)?;

    let max = budget.limits().max_file_bytes;
    let bytes = match read_bounded(path, max) {
        Ok(BoundedRead::Bytes(bytes)) => bytes,
        Ok(BoundedRead::TooLarge) => return Err(file_too_large(relative, size, max)),
        Err(e) => return Err(clone_failed(format!("{e:#}"))),
    };
    // The budget was charged with the metadata size; a file that changed in
    // between would make the running totals wrong.
    if bytes.len() as u64 != size {
        return Err(clone_failed(format!("{relative} changed while being collected")));
    }

    files.push(build_record(relative, &bytes));
    Ok(())
}
