//! Async refresh orchestrator.
//!
//! Runs [`DataManager`] in a tokio task, analysing each snapshot and sending
//! [`DashboardUpdate`]s through an `mpsc` channel so the presentation layer
//! can consume them without any shared mutable state.

use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use newsletter_data::analysis::{analyze_snapshot, AnalysisResult};
use newsletter_data::reader::SheetSource;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time;

use crate::data_manager::DataManager;

// ── Public types ──────────────────────────────────────────────────────────────

/// One refreshed view of the dashboard, forwarded to the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardUpdate {
    pub analysis: AnalysisResult,
    /// Name of the sheet that was analysed.
    pub sheet: String,
    pub refreshed_at: DateTime<Utc>,
    /// Set when the latest fetch failed and `analysis` comes from the cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_reason: Option<String>,
}

// ── RefreshOrchestrator ───────────────────────────────────────────────────────

/// Background refresh coordinator.
///
/// Call [`RefreshOrchestrator::start`] to spin up the refresh loop in a
/// dedicated tokio task and receive a channel endpoint for updates.
pub struct RefreshOrchestrator {
    refresh_interval: Duration,
    source: Box<dyn SheetSource + Send>,
    /// Sheet to analyse; `None` selects the first sheet.
    sheet: Option<String>,
}

impl RefreshOrchestrator {
    pub fn new(
        refresh_interval_secs: u64,
        source: Box<dyn SheetSource + Send>,
        sheet: Option<String>,
    ) -> Self {
        Self {
            refresh_interval: Duration::from_secs(refresh_interval_secs),
            source,
            sheet,
        }
    }

    /// Start the refresh loop.
    ///
    /// Returns the receiving end of the update channel and a
    /// [`RefreshHandle`] that can abort the loop.
    pub fn start(self) -> (mpsc::Receiver<DashboardUpdate>, RefreshHandle) {
        let (tx, rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            self.refresh_loop(tx).await;
        });

        (rx, RefreshHandle { handle })
    }

    // ── Private implementation ────────────────────────────────────────────

    /// Fetch immediately, then once per `refresh_interval`, until the
    /// receiver is dropped.
    async fn refresh_loop(self, tx: mpsc::Sender<DashboardUpdate>) {
        let RefreshOrchestrator {
            refresh_interval,
            source,
            sheet,
        } = self;
        // Half the interval keeps every tick a real fetch.
        let mut data_manager = DataManager::new(source, refresh_interval / 2);

        fetch_and_send(&mut data_manager, sheet.as_deref(), &tx, true).await;

        let mut interval = time::interval(refresh_interval);
        // The first tick fires immediately; we already fetched above.
        interval.tick().await;

        loop {
            interval.tick().await;

            if tx.is_closed() {
                tracing::debug!("update channel closed; exiting refresh loop");
                break;
            }

            fetch_and_send(&mut data_manager, sheet.as_deref(), &tx, false).await;
        }
    }
}

/// Fetch (or reuse) the snapshot, analyse it, and send the update.
async fn fetch_and_send(
    data_manager: &mut DataManager,
    sheet: Option<&str>,
    tx: &mpsc::Sender<DashboardUpdate>,
    force: bool,
) {
    let today = Local::now().date_naive();
    let analysis = match data_manager.get_data(force) {
        Some(snapshot) => analyze_snapshot(snapshot, sheet, today),
        None => {
            tracing::warn!("no snapshot available; skipping update");
            return;
        }
    };

    let analysis = match analysis {
        Ok(a) => a,
        Err(e) => {
            tracing::warn!(error = %e, "could not analyse snapshot; skipping update");
            return;
        }
    };

    let update = DashboardUpdate {
        sheet: analysis.sheet.clone().unwrap_or_default(),
        analysis,
        refreshed_at: Utc::now(),
        stale_reason: data_manager.last_error().map(str::to_string),
    };

    if let Err(e) = tx.send(update).await {
        tracing::warn!(error = %e, "failed to send dashboard update; receiver dropped");
    }
}

// ── RefreshHandle ─────────────────────────────────────────────────────────────

/// A handle to the background refresh task.
pub struct RefreshHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl RefreshHandle {
    /// Immediately abort the refresh loop.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
