//! Main analysis pipeline for the newsletter dashboard.
//!
//! Turns one sheet into the weekly series, its summary, the growth and
//! monthly series, and metadata about the run, returning an
//! [`AnalysisResult`] ready for the presentation layer.

use chrono::{NaiveDate, Utc};
use newsletter_core::calculations::SummaryCalculator;
use newsletter_core::error::Result;
use newsletter_core::fields::DetectedColumns;
use newsletter_core::models::{
    MonthlyMetrics, SheetOverview, SheetSnapshot, SummaryStats, WeeklyGrowth, WeeklyMetric,
};
use serde::{Deserialize, Serialize};

use crate::aggregator::SeriesAggregator;
use crate::series::SeriesBuilder;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    /// Data rows in the sheet, header excluded.
    pub rows_read: usize,
    /// Rows dropped for an empty week cell.
    pub rows_dropped: usize,
    /// Weeks in the final series.
    pub weeks_parsed: usize,
    /// Column index chosen for each field.
    pub columns: DetectedColumns,
}

/// The complete output of [`analyze_table`] / [`analyze_snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Name of the analysed sheet; `None` for a bare table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    pub series: Vec<WeeklyMetric>,
    pub summary: SummaryStats,
    pub weekly_growth: Vec<WeeklyGrowth>,
    pub monthly: Vec<MonthlyMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<SheetOverview>,
    /// Snapshot timestamp as reported by the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the pipeline over a single raw table.
///
/// 1. Build the ordered weekly series.
/// 2. Summarize it.
/// 3. Derive week-over-week growth and monthly roll-ups.
///
/// Never fails: malformed tables degrade to an empty series.
pub fn analyze_table(table: &[Vec<String>], today: NaiveDate) -> AnalysisResult {
    let built = SeriesBuilder::build(table, today);

    let summary = SummaryCalculator::calculate(&built.series);
    let weekly_growth = SeriesAggregator::weekly_growth(&built.series);
    let monthly = SeriesAggregator::aggregate_monthly(&built.series, today);

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        rows_read: built.rows_read,
        rows_dropped: built.rows_dropped,
        weeks_parsed: built.series.len(),
        columns: built.columns,
    };

    tracing::debug!(
        rows = metadata.rows_read,
        weeks = metadata.weeks_parsed,
        months = monthly.len(),
        "analysis complete"
    );

    AnalysisResult {
        sheet: None,
        series: built.series,
        summary,
        weekly_growth,
        monthly,
        overview: None,
        last_updated: None,
        metadata,
    }
}

/// Resolve the active sheet of `snapshot` and analyse it.
///
/// `sheet` selects a sheet by name; `None` picks the first one. Errors only
/// when the requested sheet is absent or the workbook is empty.
pub fn analyze_snapshot(
    snapshot: &SheetSnapshot,
    sheet: Option<&str>,
    today: NaiveDate,
) -> Result<AnalysisResult> {
    let (name, table) = snapshot.active_sheet(sheet)?;

    let mut result = analyze_table(table, today);
    result.sheet = Some(name.to_string());
    result.overview = snapshot.overview();
    result.last_updated = snapshot.last_updated.clone();
    Ok(result)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
