//! # Form Snapshots
//!
//! Save and restore the form's fields with atomic write semantics:
//! serialize, write to `<file>.tmp`, fsync, then rename over the target.
//! An interrupted save never leaves a half-written snapshot behind.
//!
//! Snapshots are JSON and carry a schema version that is checked on load.
//!
//! ## Example
//!
//! ```rust,no_run
//! use selector_core::session::FormSession;
//! use selector_core::snapshot::{load_snapshot, save_snapshot};
//! use std::path::Path;
//!
//! let session = FormSession::new();
//! save_snapshot(&session.snapshot(), Path::new("bore.json"))?;
//!
//! let mut restored = FormSession::new();
//! restored.restore(load_snapshot(Path::new("bore.json"))?);
//! # Ok::<(), selector_core::errors::SelectorError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::derivation::LengthMode;
use crate::errors::{SelectorError, SelectorResult};
use crate::fields::FieldSet;

/// Snapshot schema version
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Saved state of one form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub version: String,
    pub saved_at: DateTime<Utc>,
    pub fields: FieldSet,
    #[serde(flatten)]
    pub length_mode: LengthMode,
}

impl FormSnapshot {
    pub fn new(fields: FieldSet, length_mode: LengthMode) -> Self {
        FormSnapshot {
            version: SCHEMA_VERSION.to_string(),
            saved_at: Utc::now(),
            fields,
            length_mode,
        }
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write a snapshot atomically.
pub fn save_snapshot(snapshot: &FormSnapshot, path: &Path) -> SelectorResult<()> {
    let json = serde_json::to_string_pretty(snapshot).map_err(|e| SelectorError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        SelectorError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        SelectorError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        SelectorError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        SelectorError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::info!(path = %path.display(), "snapshot saved");
    Ok(())
}

/// Read a snapshot and check its schema version.
///
/// # Returns
///
/// * `Err(SelectorError::VersionMismatch)` - written by an incompatible version
/// * `Err(SelectorError::SerializationError)` - not a snapshot
/// * `Err(SelectorError::FileError)` - I/O error
pub fn load_snapshot(path: &Path) -> SelectorResult<FormSnapshot> {
    let mut file = File::open(path)
        .map_err(|e| SelectorError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| SelectorError::file_error("read", path.display().to_string(), e.to_string()))?;

    let snapshot: FormSnapshot =
        serde_json::from_str(&contents).map_err(|e| SelectorError::SerializationError {
            reason: format!("Invalid snapshot in {}: {}", path.display(), e),
        })?;

    validate_version(&snapshot.version)?;
    tracing::info!(path = %path.display(), saved_at = %snapshot.saved_at, "snapshot loaded");
    Ok(snapshot)
}

/// Major versions must match; within 0.x a newer minor is refused.
fn validate_version(file_version: &str) -> SelectorResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || SelectorError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    if file_parts.is_empty() || current_parts.is_empty() || file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(mismatch());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn temp_snapshot_path(name: &str) -> PathBuf {
        temp_dir().join(format!("shaft_selector_test_{}.json", name))
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_snapshot_path("save_load");
        let mut fields = FieldSet::default();
        fields.shaft_diameter = 48.0;
        fields.hub_outer_diameter = Some(90.0);
        let mut mode = LengthMode::default();
        mode.mark_overridden();

        save_snapshot(&FormSnapshot::new(fields.clone(), mode), &path).unwrap();
        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded.fields, fields);
        assert!(!loaded.length_mode.length_is_auto_derived);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let path = temp_snapshot_path("atomic");
        save_snapshot(&FormSnapshot::new(FieldSet::default(), LengthMode::default()), &path).unwrap();
        assert!(!tmp_path_for(&path).exists());
        assert!(path.exists());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_mode_is_a_top_level_key() {
        let snapshot = FormSnapshot::new(FieldSet::default(), LengthMode::default());
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["length_is_auto_derived"], true);
        assert_eq!(json["version"], SCHEMA_VERSION);
    }

    #[test]
    fn test_newer_schema_refused() {
        assert!(validate_version("0.1.0").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(matches!(validate_version("0.2.0"), Err(SelectorError::VersionMismatch { .. })));
        assert!(matches!(validate_version("1.0.0"), Err(SelectorError::VersionMismatch { .. })));
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_snapshot(&temp_snapshot_path("missing_never_written")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_rejects_non_snapshot() {
        let path = temp_snapshot_path("not_a_snapshot");
        fs::write(&path, "{\"hello\": 1}").unwrap();
        let err = load_snapshot(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }
}
