//! Manifest parsing and the essential-field fallback check.
//!
//! Pure functions only: text in, `serde_json::Value` or violations out.
//! Full JSON-schema validation needs the schema artifact on disk and lives
//! in `crate::infra::manifest`.

use serde_json::Value;

use crate::domain::error::{GitSyncError, GitSyncErrorCode, SyncOutcome};

/// Preferred manifest, YAML.
pub const PRIMARY_MANIFEST: &str = "construct.yaml";
/// Legacy manifest, JSON. Read only when the primary is absent or unparseable.
pub const FALLBACK_MANIFEST: &str = "manifest.json";

/// Fields checked when no schema is available, in reporting order.
pub const ESSENTIAL_FIELDS: &[&str] = &["name", "slug", "version"];

/// Parse the primary YAML manifest.
///
/// # Errors
///
/// Returns a description of the problem if the text is not YAML or its
/// top level is not a mapping.
pub fn parse_primary(text: &str) -> Result<Value, String> {
    let value: Value = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
    require_mapping(value)
}

/// Parse the fallback JSON manifest.
///
/// # Errors
///
/// Returns a description of the problem if the text is not JSON or its
/// top level is not an object.
pub fn parse_fallback(text: &str) -> Result<Value, String> {
    let value: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    require_mapping(value)
}

fn require_mapping(value: Value) -> Result<Value, String> {
    if value.is_object() {
        Ok(value)
    } else {
        Err("manifest top level must be a mapping".to_string())
    }
}

/// Every essential field that is missing or not a string.
#[must_use]
pub fn essential_field_violations(manifest: &Value) -> Vec<String> {
    ESSENTIAL_FIELDS
        .iter()
        .filter_map(|field| match manifest.get(field) {
            None | Some(Value::Null) => Some(format!("missing required field: {field}")),
            Some(Value::String(_)) => None,
            Some(_) => Some(format!("field '{field}' must be a string")),
        })
        .collect()
}

/// Degraded validation: essential fields only.
///
/// # Errors
///
/// `MANIFEST_VALIDATION_FAILED` listing every violation.
pub fn check_essential_fields(manifest: &Value) -> SyncOutcome<()> {
    let violations = essential_field_violations(manifest);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(validation_failed(&violations))
    }
}

/// Aggregate violations into the single error the stage reports.
#[must_use]
pub fn validation_failed(violations: &[String]) -> GitSyncError {
    GitSyncError::new(
        GitSyncErrorCode::ManifestValidationFailed,
        format!("Manifest validation failed:\n{}", violations.join("\n")),
    )
}

#[must_use]
pub fn no_manifest() -> GitSyncError {
    GitSyncError::new(
        GitSyncErrorCode::NoManifest,
        format!("No valid {PRIMARY_MANIFEST} or {FALLBACK_MANIFEST} found"),
    )
}

/// The declared version, or an empty string when the manifest has none.
#[must_use]
pub fn manifest_version(manifest: &Value) -> String {
    manifest
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
