//! Filesystem helpers shared by the read-side stages.

use std::io::Read;
use std::path::{Component, Path};

use anyhow::{Context, Result, anyhow};

/// Outcome of a size-bounded read.
#[derive(Debug, PartialEq, Eq)]
pub enum BoundedRead {
    Bytes(Vec<u8>),
    /// The file holds more than the allowed number of bytes.
    TooLarge,
}

/// Reads a regular file after verifying it is not a symlink, never holding
/// more than `max_bytes + 1` bytes in memory.
///
/// NOTE: narrow TOCTOU window between `symlink_metadata()` and `open()`.
/// The tree has already been validated and nothing else writes to the
/// ephemeral checkout, and the read itself is bounded regardless.
pub fn read_bounded(path: &Path, max_bytes: u64) -> Result<BoundedRead> {
    let meta =
        std::fs::symlink_metadata(path).with_context(|| format!("stat {}", path.display()))?;
    if !meta.file_type().is_file() {
        return Err(anyhow!("Refusing to read non-regular file: {}", path.display()));
    }
    if meta.len() > max_bytes {
        return Ok(BoundedRead::TooLarge);
    }

    let file = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut buf = Vec::with_capacity(usize::try_from(meta.len()).unwrap_or(0));
    file.take(max_bytes.saturating_add(1))
        .read_to_end(&mut buf)
        .with_context(|| format!("read {}", path.display()))?;
    if buf.len() as u64 > max_bytes {
        return Ok(BoundedRead::TooLarge);
    }
    Ok(BoundedRead::Bytes(buf))
}

/// `path` relative to `root`, `/`-joined. `None` if `path` is not under
/// `root`.
#[must_use]
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_string_lossy().into_owned(),
            Component::ParentDir => "..".to_string(),
            Component::CurDir => ".".to_string(),
            Component::RootDir | Component::Prefix(_) => String::new(),
        })
        .collect();
    Some(parts.join("/"))
}

/// Run blocking filesystem work off the async runtime.
///
/// A panic inside `f` is resumed on the calling task, so scoped guards held
/// by the caller still run during unwinding.
pub async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(value) => value,
        Err(e) => std::panic::resume_unwind(e.into_panic()),
    }
}
