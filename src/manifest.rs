//! Manifest version bumping.
//!
//! The manifest is a JSON document (package.json by default) with a
//! string `version` field. Bumping rewrites only that field; every
//! other key/value pair survives the round trip, in original order
//! (serde_json's `preserve_order` feature).

use std::fs;
use std::path::Path;

use regex::Regex;
use serde_json::Value;

use crate::error::{ReleaseError, Result};
use crate::version::{bump_version, parse_version, BumpMode};

/// Bumps the `version` field of the manifest at `path` in place.
///
/// Reads the manifest, increments the segment selected by `mode`, and
/// writes the whole document back pretty-printed. Not idempotent:
/// calling twice advances the version twice.
///
/// # Arguments
/// * `path` - Path to the JSON manifest
/// * `mode` - Which segment to increment (see [BumpMode])
///
/// # Returns
/// * `Ok((previous, current))` - Version strings before and after the bump
/// * `Err(ReleaseError::ManifestRead)` - Missing file, invalid JSON, or
///   absent/malformed version field
/// * `Err(ReleaseError::ManifestWrite)` - The rewritten manifest could
///   not be written back
pub fn bump(path: &Path, mode: BumpMode) -> Result<(String, String)> {
    let raw = fs::read_to_string(path).map_err(|e| {
        ReleaseError::manifest_read(format!("{}: {}", path.display(), e))
    })?;

    let mut doc: Value = serde_json::from_str(&raw).map_err(|e| {
        ReleaseError::manifest_read(format!("{} is not valid JSON: {}", path.display(), e))
    })?;

    let previous = read_version_field(&doc, path)?;
    let current = bump_version(parse_version(&previous)?, mode)?.to_string();

    match doc.get_mut("version") {
        Some(field) => *field = Value::String(current.clone()),
        None => {
            return Err(ReleaseError::manifest_read(format!(
                "{} has no version field",
                path.display()
            )))
        }
    }

    let rendered = serde_json::to_string_pretty(&doc).map_err(|e| {
        ReleaseError::manifest_write(format!("failed to serialize manifest: {}", e))
    })?;
    fs::write(path, rendered + "\n").map_err(|e| {
        ReleaseError::manifest_write(format!("{}: {}", path.display(), e))
    })?;

    Ok((previous, current))
}

/// Extracts and validates the `version` string field of a manifest document.
fn read_version_field(doc: &Value, path: &Path) -> Result<String> {
    let version = doc
        .get("version")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ReleaseError::manifest_read(format!(
                "{} has no string version field",
                path.display()
            ))
        })?;

    let re = Regex::new(r"^\d+\.\d+\.\d+$")
        .map_err(|e| ReleaseError::manifest_read(e.to_string()))?;
    if !re.is_match(version) {
        return Err(ReleaseError::manifest_read(format!(
            "version '{}' in {} does not match major.minor.patch",
            version,
            path.display()
        )));
    }

    Ok(version.to_string())
}
