//! Spreadsheet snapshot loading.
//!
//! A snapshot file is either the full API response
//! (`{ success, data: { sheet: rows }, sheets, lastUpdated, error }`) or a bare
//! 2-D array of rows, which is wrapped as a single sheet named after the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use newsletter_core::error::{DashboardError, Result};
use newsletter_core::models::{RawTable, SheetSnapshot};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Sheet name used for a bare array file without a usable file stem.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

// ── SheetSource ───────────────────────────────────────────────────────────────

/// Anything that can produce a fresh [`SheetSnapshot`].
pub trait SheetSource {
    fn fetch(&self) -> Result<SheetSnapshot>;

    /// Short human-readable origin, used in log lines.
    fn describe(&self) -> String;
}

/// Reads the snapshot from a JSON file on every fetch.
#[derive(Debug, Clone)]
pub struct FileSheetSource {
    path: PathBuf,
}

impl FileSheetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SheetSource for FileSheetSource {
    fn fetch(&self) -> Result<SheetSnapshot> {
        load_snapshot(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load and validate a snapshot file.
///
/// Errors when the file is missing or unreadable, is not JSON, has an
/// unsupported top-level shape, or reports `success: false`.
pub fn load_snapshot(path: &Path) -> Result<SheetSnapshot> {
    if !path.exists() {
        return Err(DashboardError::DataPathNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content)?;

    let snapshot = match value {
        Value::Array(rows) => wrap_bare_table(path, rows),
        Value::Object(obj) => snapshot_from_object(obj),
        other => {
            return Err(DashboardError::SnapshotRejected(format!(
                "{}: expected an object or an array of rows, found {}",
                path.display(),
                json_kind(&other)
            )))
        }
    };

    if !snapshot.success {
        let reason = snapshot
            .error
            .unwrap_or_else(|| "source reported failure".to_string());
        return Err(DashboardError::SnapshotRejected(reason));
    }

    debug!(
        "Loaded snapshot from {}: {} sheet(s)",
        path.display(),
        snapshot.data.len()
    );
    Ok(snapshot)
}

/// Convert a JSON cell to its text form: strings as-is, numbers and booleans
/// stringified, `null` as an empty cell.
pub fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn snapshot_from_object(obj: Map<String, Value>) -> SheetSnapshot {
    // A document without `success` but with data is taken at face value.
    let success = obj.get("success").and_then(Value::as_bool).unwrap_or(true);

    let mut data = BTreeMap::new();
    if let Some(Value::Object(sheets)) = obj.get("data") {
        for (name, rows) in sheets {
            match rows {
                Value::Array(rows) => {
                    data.insert(name.clone(), rows_to_table(name, rows));
                }
                other => warn!("Skipping sheet \"{}\": not an array ({})", name, json_kind(other)),
            }
        }
    }

    let sheets = obj
        .get("sheets")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    SheetSnapshot {
        success,
        data,
        sheets,
        last_updated: obj
            .get("lastUpdated")
            .and_then(Value::as_str)
            .map(str::to_string),
        error: obj.get("error").and_then(Value::as_str).map(str::to_string),
    }
}

fn wrap_bare_table(path: &Path, rows: Vec<Value>) -> SheetSnapshot {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SHEET_NAME)
        .to_string();

    let last_updated = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(|t| DateTime::<Utc>::from(t).to_rfc3339());

    let table = rows_to_table(&name, &rows);
    let mut data = BTreeMap::new();
    data.insert(name.clone(), table);

    SheetSnapshot {
        success: true,
        data,
        sheets: vec![name],
        last_updated,
        error: None,
    }
}

fn rows_to_table(sheet: &str, rows: &[Value]) -> RawTable {
    rows.iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Array(cells) => cells.iter().map(cell_to_string).collect(),
            other => {
                debug!("Sheet \"{}\" row {} is not an array; using a single cell", sheet, i);
                vec![cell_to_string(other)]
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    // ── full snapshot object ─────────────────────────────────────────────────

    #[test]
    fn test_load_full_snapshot() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(
            tmp.path(),
            "sheets.json",
            r#"{
                "success": true,
                "data": {
                    "Weekly": [["Week", "Open Rate"], ["1/1/24", "45%"]],
                    "Notes": [["Note"]]
                },
                "sheets": ["Weekly", "Notes"],
                "lastUpdated": "2024-01-09T10:00:00Z"
            }"#,
        );

        let snapshot = load_snapshot(&path).unwrap();
        assert!(snapshot.success);
        assert_eq!(snapshot.sheets, vec!["Weekly", "Notes"]);
        assert_eq!(snapshot.data["Weekly"][1], vec!["1/1/24", "45%"]);
        assert_eq!(snapshot.last_updated.as_deref(), Some("2024-01-09T10:00:00Z"));
        assert!(snapshot.error.is_none());
    }

    #[test]
    fn test_non_string_cells_are_stringified() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(
            tmp.path(),
            "sheets.json",
            r#"{"success": true, "data": {"S": [["Week", "Subs", "Flag", "Open"], ["1/1/24", 1050, true, null]]}}"#,
        );

        let snapshot = load_snapshot(&path).unwrap();
        assert_eq!(snapshot.data["S"][1], vec!["1/1/24", "1050", "true", ""]);
    }

    #[test]
    fn test_missing_success_defaults_to_true() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "s.json", r#"{"data": {"S": [["Week"]]}}"#);
        assert!(load_snapshot(&path).unwrap().success);
    }

    #[test]
    fn test_non_array_sheet_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(
            tmp.path(),
            "s.json",
            r#"{"success": true, "data": {"Good": [["Week"]], "Bad": "oops"}}"#,
        );
        let snapshot = load_snapshot(&path).unwrap();
        assert!(snapshot.data.contains_key("Good"));
        assert!(!snapshot.data.contains_key("Bad"));
    }

    // ── bare array ───────────────────────────────────────────────────────────

    #[test]
    fn test_bare_array_is_wrapped_as_single_sheet() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(
            tmp.path(),
            "weekly.json",
            r#"[["Week", "Open Rate"], ["1/1/24", 0.45]]"#,
        );

        let snapshot = load_snapshot(&path).unwrap();
        assert!(snapshot.success);
        assert_eq!(snapshot.sheets, vec!["weekly"]);
        assert_eq!(snapshot.data["weekly"][1], vec!["1/1/24", "0.45"]);
        assert!(snapshot.last_updated.is_some());
    }

    // ── errors ───────────────────────────────────────────────────────────────

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = load_snapshot(&tmp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, DashboardError::DataPathNotFound(_)));
    }

    #[test]
    fn test_malformed_json() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "bad.json", "{not json");
        let err = load_snapshot(&path).unwrap_err();
        assert!(matches!(err, DashboardError::JsonParse(_)));
    }

    #[test]
    fn test_unsupported_top_level_shape() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "n.json", "42");
        let err = load_snapshot(&path).unwrap_err();
        assert!(matches!(err, DashboardError::SnapshotRejected(_)));
    }

    #[test]
    fn test_unsuccessful_snapshot_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(
            tmp.path(),
            "s.json",
            r#"{"success": false, "error": "Failed to fetch spreadsheet data"}"#,
        );
        match load_snapshot(&path).unwrap_err() {
            DashboardError::SnapshotRejected(msg) => {
                assert_eq!(msg, "Failed to fetch spreadsheet data")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // ── FileSheetSource ──────────────────────────────────────────────────────

    #[test]
    fn test_file_source_reads_current_contents() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(tmp.path(), "w.json", r#"[["Week"], ["1/1/24"]]"#);
        let source = FileSheetSource::new(&path);
        assert_eq!(source.fetch().unwrap().data["w"].len(), 2);

        write_file(tmp.path(), "w.json", r#"[["Week"], ["1/1/24"], ["1/8/24"]]"#);
        assert_eq!(source.fetch().unwrap().data["w"].len(), 3);
        assert_eq!(source.describe(), path.display().to_string());
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Value::from("45%")), "45%");
        assert_eq!(cell_to_string(&Value::from(1050)), "1050");
        assert_eq!(cell_to_string(&Value::from(45.5)), "45.5");
        assert_eq!(cell_to_string(&Value::Null), "");
    }
}
