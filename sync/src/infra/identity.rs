//! Best-effort identity extraction. Never fails the sync.

use std::path::Path;

use crate::domain::identity::{
    EXPERTISE_FILE, IDENTITY_DIR, IdentityDoc, PERSONA_FILE, build_identity, parse_doc,
};
use crate::infra::fs::{BoundedRead, read_bounded};
use construct_common::IdentityData;

/// Read `identity/persona.yaml` and `identity/expertise.yaml`.
///
/// Returns `None` when the directory is absent or neither file yields a
/// document; a file that cannot be read or parsed counts as absent.
pub fn read_identity(root: &Path, max_file_bytes: u64) -> Option<IdentityData> {
    let dir = root.join(IDENTITY_DIR);
    match dir.symlink_metadata() {
        Ok(meta) if meta.file_type().is_dir() => {}
        _ => return None,
    }

    let persona = read_doc(&dir, PERSONA_FILE, max_file_bytes);
    let expertise = read_doc(&dir, EXPERTISE_FILE, max_file_bytes);
    build_identity(persona, expertise)
}

fn read_doc(dir: &Path, name: &str, max_file_bytes: u64) -> Option<IdentityDoc> {
    let path = dir.join(name);
    path.symlink_metadata().ok()?;

    let bytes = match read_bounded(&path, max_file_bytes) {
        Ok(BoundedRead::Bytes(bytes)) => bytes,
        Ok(BoundedRead::TooLarge) => {
            tracing::warn!(file = name, "identity file too large; ignoring");
            return None;
        }
        Err(e) => {
            tracing::warn!(file = name, error = %format!("{e:#}"), "identity file unreadable");
            return None;
        }
    };
    let Ok(raw) = String::from_utf8(bytes) else {
        tracing::warn!(file = name, "identity file is not UTF-8; ignoring");
        return None;
    };
    match parse_doc(raw) {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::warn!(file = name, error = %e, "identity file failed to parse");
            None
        }
    }
}
