//! Manifest location, parsing and schema validation.
//!
//! The compiled schema is process-wide: built once on first use behind a
//! `OnceLock` and read-only afterwards, so concurrent syncs share it freely.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::domain::error::{SyncOutcome, file_too_large};
use crate::domain::manifest::{
    FALLBACK_MANIFEST, PRIMARY_MANIFEST, check_essential_fields, no_manifest, parse_fallback,
    parse_primary, validation_failed,
};
use crate::infra::fs::{BoundedRead, read_bounded};

static SHARED_SCHEMA: OnceLock<ManifestSchema> = OnceLock::new();

/// Manifest validation strategy.
#[derive(Debug)]
pub enum ManifestSchema {
    /// Full JSON-schema validation.
    Compiled(Box<jsonschema::Validator>),
    /// No usable schema artifact: essential fields only.
    Unavailable,
}

/// The process-wide schema, loaded from `path` on first call. Later calls
/// return the same instance whatever path they pass.
pub fn shared(path: &Path) -> &'static ManifestSchema {
    SHARED_SCHEMA.get_or_init(|| ManifestSchema::load(path))
}

impl ManifestSchema {
    /// Load and compile the schema at `path`, degrading to
    /// [`ManifestSchema::Unavailable`] if it is missing or unusable.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    schema = %path.display(),
                    error = %e,
                    "manifest schema not available; validating essential fields only",
                );
                return Self::Unavailable;
            }
        };
        match Self::from_json(&text) {
            Ok(schema) => {
                tracing::info!(schema = %path.display(), "manifest schema loaded");
                schema
            }
            Err(e) => {
                tracing::warn!(
                    schema = %path.display(),
                    error = %format!("{e:#}"),
                    "manifest schema unusable; validating essential fields only",
                );
                Self::Unavailable
            }
        }
    }

    /// Compile a schema from its JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let schema: Value = serde_json::from_str(text).context("parse manifest schema")?;
        let validator = jsonschema::options()
            .build(&schema)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .context("compile manifest schema")?;
        Ok(Self::Compiled(Box::new(validator)))
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    /// Validate `manifest`, reporting every violation at once.
    ///
    /// # Errors
    ///
    /// `MANIFEST_VALIDATION_FAILED`.
    pub fn validate(&self, manifest: &Value) -> SyncOutcome<()> {
        match self {
            Self::Compiled(validator) => {
                let violations: Vec<String> = validator
                    .iter_errors(manifest)
                    .map(|error| {
                        let path = error.instance_path.to_string();
                        let location = if path.is_empty() { "/".to_string() } else { path };
                        format!("{location}: {error}")
                    })
                    .collect();
                if violations.is_empty() {
                    Ok(())
                } else {
                    Err(validation_failed(&violations))
                }
            }
            Self::Unavailable => {
                tracing::debug!("degraded manifest validation (essential fields only)");
                check_essential_fields(manifest)
            }
        }
    }
}

/// Find, parse and validate the manifest under `root`.
///
/// `construct.yaml` is tried first; `manifest.json` only when the primary
/// is missing or fails to parse.
///
/// # Errors
///
/// `NO_MANIFEST` if neither parses, `FILE_TOO_LARGE` if one exceeds
/// `max_file_bytes`, or `MANIFEST_VALIDATION_FAILED`.
pub fn read_manifest(
    root: &Path,
    schema: &ManifestSchema,
    max_file_bytes: u64,
) -> SyncOutcome<Value> {
    let manifest = match load(root, PRIMARY_MANIFEST, parse_primary, max_file_bytes)? {
        Some(manifest) => manifest,
        None => load(root, FALLBACK_MANIFEST, parse_fallback, max_file_bytes)?
            .ok_or_else(no_manifest)?,
    };
    schema.validate(&manifest)?;
    Ok(manifest)
}

fn load(
    root: &Path,
    name: &str,
    parse: fn(&str) -> Result<Value, String>,
    max_file_bytes: u64,
) -> SyncOutcome<Option<Value>> {
    let path = root.join(name);
    if path.symlink_metadata().is_err() {
        return Ok(None);
    }
    let bytes = match read_bounded(&path, max_file_bytes) {
        Ok(BoundedRead::Bytes(bytes)) => bytes,
        Ok(BoundedRead::TooLarge) => {
            let size = path
                .symlink_metadata()
                .map_or(max_file_bytes.saturating_add(1), |m| m.len());
            return Err(file_too_large(name, size, max_file_bytes));
        }
        Err(e) => {
            tracing::warn!(manifest = name, error = %format!("{e:#}"), "manifest unreadable");
            return Ok(None);
        }
    };
    let Ok(text) = String::from_utf8(bytes) else {
        tracing::warn!(manifest = name, "manifest is not UTF-8");
        return Ok(None);
    };
    match parse(&text) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(manifest = name, error = %e, "manifest failed to parse");
            Ok(None)
        }
    }
}
