use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Snapshot file names looked for when `--data-file` is not given.
const DEFAULT_DATA_FILES: &[&str] = &["sheets.json", "newsletter.json"];

// ── Directory bootstrap ────────────────────────────────────────────────────────

fn app_dir_in(home: &Path) -> PathBuf {
    home.join(".newsletter-dashboard")
}

/// Ensure `~/.newsletter-dashboard/` and its `logs/` subdirectory exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    ensure_directories_in(&home)
}

fn ensure_directories_in(home: &Path) -> anyhow::Result<()> {
    let app_dir = app_dir_in(home);
    std::fs::create_dir_all(&app_dir)?;
    std::fs::create_dir_all(app_dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `DEBUG|INFO|WARNING|ERROR|CRITICAL` level name to an [`EnvFilter`]
/// directive. Unknown names are passed through unchanged.
fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Logs go to stderr so they never mix with the report on stdout. When
/// `log_file` is set, a second plain-text layer appends to that file.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(filter_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

// ── Data-file discovery ────────────────────────────────────────────────────────

/// Locate a snapshot file when none was configured.
///
/// Checks the current directory, then `~/.newsletter-dashboard/`, for each
/// name in [`DEFAULT_DATA_FILES`] and returns the first that exists.
pub fn discover_data_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok();
    let app_dir = dirs::home_dir().map(|home| app_dir_in(&home));
    discover_data_file_in(cwd.iter().chain(app_dir.iter()).map(PathBuf::as_path))
}

fn discover_data_file_in<'a>(candidates: impl Iterator<Item = &'a Path>) -> Option<PathBuf> {
    candidates
        .flat_map(|dir| DEFAULT_DATA_FILES.iter().map(move |name| dir.join(name)))
        .find(|p| p.is_file())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
