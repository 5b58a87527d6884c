use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the newsletter dashboard.
///
/// The normalization core never returns these; they come from the snapshot
/// I/O layer and the CLI.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A snapshot file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The spreadsheet source reported `success: false`.
    #[error("Spreadsheet source rejected the request: {0}")]
    SnapshotRejected(String),

    /// The configured snapshot path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// A sheet name was requested that the workbook does not contain.
    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),

    /// The workbook contains no sheets at all.
    #[error("Workbook contains no sheets")]
    EmptyWorkbook,
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
