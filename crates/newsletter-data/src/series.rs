//! Raw table → ordered weekly series.

use chrono::{Local, NaiveDate};
use newsletter_core::dates::parse_week_date_at;
use newsletter_core::fields::{detect_columns, DetectedColumns, Field};
use newsletter_core::models::WeeklyMetric;
use newsletter_core::normalize::{parse_count, parse_percent};
use tracing::{debug, warn};

// ── BuiltSeries ───────────────────────────────────────────────────────────────

/// A normalized series together with the bookkeeping from building it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltSeries {
    /// Weekly metrics in ascending date order.
    pub series: Vec<WeeklyMetric>,
    pub columns: DetectedColumns,
    /// Data rows seen, header excluded.
    pub rows_read: usize,
    /// Rows dropped for an empty week cell.
    pub rows_dropped: usize,
}

// ── SeriesBuilder ─────────────────────────────────────────────────────────────

pub struct SeriesBuilder;

impl SeriesBuilder {
    /// Normalize every data row of `table` and sort by resolved week date.
    ///
    /// Row 0 is the header. Tables with fewer than two rows yield an empty
    /// series. Rows whose week cell is empty are dropped; rows with equal
    /// dates keep their source order.
    pub fn build(table: &[Vec<String>], today: NaiveDate) -> BuiltSeries {
        let Some((header, rows)) = table.split_first() else {
            return BuiltSeries::default();
        };

        let columns = detect_columns(header);
        if rows.is_empty() {
            return BuiltSeries {
                columns,
                ..BuiltSeries::default()
            };
        }

        if columns.week.is_none() {
            warn!("No week column found in header {:?}; every row will be dropped", header);
        } else {
            for field in columns.missing() {
                debug!("No {} column found; defaulting to 0", field.as_str());
            }
        }

        let mut keyed: Vec<(NaiveDate, WeeklyMetric)> = Vec::with_capacity(rows.len());
        for row in rows {
            let week = columns.cell(row, Field::Week);
            if week.is_empty() {
                continue;
            }
            let metric = WeeklyMetric {
                week: week.to_string(),
                open_rate: parse_percent(columns.cell(row, Field::OpenRate)),
                click_rate: parse_percent(columns.cell(row, Field::ClickRate)),
                subscribers: parse_count(columns.cell(row, Field::Subscribers)),
            };
            keyed.push((parse_week_date_at(&metric.week, today), metric));
        }

        // `sort_by_key` is stable.
        keyed.sort_by_key(|(date, _)| *date);

        let rows_dropped = rows.len() - keyed.len();
        if rows_dropped > 0 {
            debug!("Dropped {} row(s) with an empty week cell", rows_dropped);
        }

        BuiltSeries {
            series: keyed.into_iter().map(|(_, metric)| metric).collect(),
            columns,
            rows_read: rows.len(),
            rows_dropped,
        }
    }
}

/// Build the ordered series using the local clock for year inference.
pub fn build_series(table: &[Vec<String>]) -> Vec<WeeklyMetric> {
    build_series_at(table, Local::now().date_naive())
}

/// Build the ordered series against an explicit reference date.
pub fn build_series_at(table: &[Vec<String>], today: NaiveDate) -> Vec<WeeklyMetric> {
    SeriesBuilder::build(table, today).series
}

// ── Tests ─────────────────────────────────────────────────────────────────────
