mod bootstrap;
mod report;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use newsletter_core::settings::Settings;
use newsletter_data::analysis::analyze_snapshot;
use newsletter_data::reader::{FileSheetSource, SheetSource};
use newsletter_runtime::orchestrator::{DashboardUpdate, RefreshOrchestrator};

use crate::report::View;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Newsletter Dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    let view: View = settings.view.parse()?;
    let json = settings.json_output();

    let data_file = settings
        .data_file
        .clone()
        .or_else(bootstrap::discover_data_file)
        .context("no snapshot file found; pass --data-file or set NEWSLETTER_DATA_FILE")?;
    tracing::info!(
        "Data file: {}, View: {}, Format: {}",
        data_file.display(),
        settings.view,
        settings.format
    );

    // Read once up front so a bad path or sheet name fails fast.
    let source = FileSheetSource::new(&data_file);
    let snapshot = source
        .fetch()
        .with_context(|| format!("could not load {}", data_file.display()))?;
    let analysis = analyze_snapshot(
        &snapshot,
        settings.sheet.as_deref(),
        Local::now().date_naive(),
    )?;

    if settings.watch {
        // The refresh loop sends its own first update; the result above only
        // validated the file and sheet.
        return watch(source, &settings, &data_file, view, json).await;
    }

    print!("{}", report::render(&analysis, view, json)?);
    Ok(())
}

async fn watch(
    source: FileSheetSource,
    settings: &Settings,
    data_file: &Path,
    view: View,
    json: bool,
) -> Result<()> {
    tracing::info!(
        "Watching {} every {}s (Ctrl+C to stop)",
        data_file.display(),
        settings.refresh_rate
    );

    let orchestrator = RefreshOrchestrator::new(
        settings.refresh_rate,
        Box::new(source),
        settings.sheet.clone(),
    );
    let (mut rx, handle) = orchestrator.start();

    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Some(update) => print_update(&update, view, json)?,
                None => {
                    tracing::debug!("refresh loop stopped");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received; shutting down refresh task");
                break;
            }
        }
    }

    handle.abort();
    Ok(())
}

fn print_update(update: &DashboardUpdate, view: View, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(update)?);
        return Ok(());
    }

    println!(
        "── {} ──",
        update.refreshed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(reason) = &update.stale_reason {
        println!("(showing cached data: {})", reason);
    }
    print!("{}", report::render(&update.analysis, view, false)?);
    Ok(())
}
