use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{DashboardError, Result};

/// Ordered rows of text cells; row 0 holds the headers.
pub type RawTable = Vec<Vec<String>>;

/// Label used for "best week" fields when there is no data.
pub const NO_WEEK: &str = "-";

/// One normalized observation: a week label plus its three metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyMetric {
    /// Week label exactly as it appeared in the source cell.
    pub week: String,
    /// Open rate as a percentage in `[0, 100]`.
    pub open_rate: f64,
    /// Click rate as a percentage in `[0, 100]`.
    pub click_rate: f64,
    /// Subscriber count at the end of the week.
    pub subscribers: u64,
}

/// Aggregate and trend figures derived from a full ordered series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub current_subscribers: u64,
    /// Change against the baseline roughly four weeks back.
    pub subscriber_growth: i64,
    pub subscriber_growth_percent: f64,
    pub avg_open_rate: f64,
    pub avg_click_rate: f64,
    /// Mean of the last four weeks minus the mean of the four before them.
    pub open_rate_trend: f64,
    pub click_rate_trend: f64,
    pub total_weeks: usize,
    pub best_open_rate_week: String,
    pub best_click_rate_week: String,
}

impl SummaryStats {
    /// The placeholder returned for an empty series.
    pub fn empty() -> Self {
        Self {
            current_subscribers: 0,
            subscriber_growth: 0,
            subscriber_growth_percent: 0.0,
            avg_open_rate: 0.0,
            avg_click_rate: 0.0,
            open_rate_trend: 0.0,
            click_rate_trend: 0.0,
            total_weeks: 0,
            best_open_rate_week: NO_WEEK.to_string(),
            best_click_rate_week: NO_WEEK.to_string(),
        }
    }
}

/// Week-over-week subscriber change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyGrowth {
    pub week: String,
    pub growth: i64,
    pub is_positive: bool,
}

/// Metrics rolled up over one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyMetrics {
    /// Display label such as `"Jan 2024"`.
    pub month: String,
    pub avg_open_rate: f64,
    pub avg_click_rate: f64,
    pub subscriber_growth: i64,
    /// Number of weekly rows that fell into this month.
    pub weeks: usize,
}

/// Row/column/sheet counts shown above the raw data table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetOverview {
    /// Data rows in the first sheet, header excluded.
    pub total_rows: usize,
    /// Width of the first sheet's header row.
    pub columns: usize,
    pub sheets: usize,
}

// ── SheetSnapshot ─────────────────────────────────────────────────────────────

/// One fetch of every sheet in the workbook, shaped like the spreadsheet API
/// response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSnapshot {
    pub success: bool,
    #[serde(default)]
    pub data: BTreeMap<String, RawTable>,
    /// Sheet names in workbook order.
    #[serde(default)]
    pub sheets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SheetSnapshot {
    /// Sheet names in display order: the explicit `sheets` list when present,
    /// otherwise the keys of `data`.
    pub fn sheet_names(&self) -> Vec<&str> {
        if self.sheets.is_empty() {
            self.data.keys().map(String::as_str).collect()
        } else {
            self.sheets.iter().map(String::as_str).collect()
        }
    }

    /// Look up a sheet by name.
    pub fn sheet(&self, name: &str) -> Result<&RawTable> {
        self.data
            .get(name)
            .ok_or_else(|| DashboardError::UnknownSheet(name.to_string()))
    }

    /// Resolve the sheet to display: `requested` when given, otherwise the
    /// first sheet. Returns the chosen name with its table.
    pub fn active_sheet(&self, requested: Option<&str>) -> Result<(&str, &RawTable)> {
        if let Some(name) = requested {
            let (key, table) = self
                .data
                .get_key_value(name)
                .ok_or_else(|| DashboardError::UnknownSheet(name.to_string()))?;
            return Ok((key.as_str(), table));
        }

        for name in self.sheet_names() {
            if let Some((key, table)) = self.data.get_key_value(name) {
                return Ok((key.as_str(), table));
            }
        }
        Err(DashboardError::EmptyWorkbook)
    }

    /// Row and column counts of the first sheet plus the sheet count.
    ///
    /// Returns `None` when there is no first sheet or it holds only a header.
    pub fn overview(&self) -> Option<SheetOverview> {
        let names = self.sheet_names();
        let first = self.data.get(*names.first()?)?;
        if first.len() < 2 {
            return None;
        }
        Some(SheetOverview {
            total_rows: first.len() - 1,
            columns: first.first().map(Vec::len).unwrap_or(0),
            sheets: names.len(),
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> RawTable {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn workbook() -> SheetSnapshot {
        let mut data = BTreeMap::new();
        data.insert(
            "Weekly".to_string(),
            table(&[&["Week", "Open", "Click"], &["1/1/24", "40%", "4%"], &["1/8/24", "42%", "5%"]]),
        );
        data.insert("Notes".to_string(), table(&[&["Note"]]));
        SheetSnapshot {
            success: true,
            data,
            sheets: vec!["Weekly".to_string(), "Notes".to_string()],
            last_updated: Some("2024-01-09T10:00:00Z".to_string()),
            error: None,
        }
    }

    // ── SummaryStats::empty ──────────────────────────────────────────────────

    #[test]
    fn test_empty_summary_uses_placeholder_weeks() {
        let s = SummaryStats::empty();
        assert_eq!(s.total_weeks, 0);
        assert_eq!(s.current_subscribers, 0);
        assert_eq!(s.best_open_rate_week, "-");
        assert_eq!(s.best_click_rate_week, "-");
    }

    #[test]
    fn test_weekly_metric_serializes_camel_case() {
        let m = WeeklyMetric {
            week: "1/1/24".to_string(),
            open_rate: 45.0,
            click_rate: 5.0,
            subscribers: 1000,
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["openRate"], 45.0);
        assert_eq!(json["clickRate"], 5.0);
        assert_eq!(json["subscribers"], 1000);
    }

    // ── SheetSnapshot ────────────────────────────────────────────────────────

    #[test]
    fn test_active_sheet_defaults_to_first_listed() {
        let wb = workbook();
        let (name, rows) = wb.active_sheet(None).unwrap();
        assert_eq!(name, "Weekly");
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_active_sheet_explicit_name() {
        let wb = workbook();
        let (name, _) = wb.active_sheet(Some("Notes")).unwrap();
        assert_eq!(name, "Notes");
    }

    #[test]
    fn test_active_sheet_unknown_name() {
        let wb = workbook();
        let err = wb.active_sheet(Some("Missing")).unwrap_err();
        assert!(matches!(err, DashboardError::UnknownSheet(ref n) if n == "Missing"));
    }

    #[test]
    fn test_active_sheet_empty_workbook() {
        let wb = SheetSnapshot::default();
        assert!(matches!(
            wb.active_sheet(None),
            Err(DashboardError::EmptyWorkbook)
        ));
    }

    #[test]
    fn test_sheet_names_fall_back_to_data_keys() {
        let mut wb = workbook();
        wb.sheets.clear();
        assert_eq!(wb.sheet_names(), vec!["Notes", "Weekly"]);
    }

    #[test]
    fn test_overview_counts_first_sheet() {
        let overview = workbook().overview().unwrap();
        assert_eq!(overview.total_rows, 2);
        assert_eq!(overview.columns, 3);
        assert_eq!(overview.sheets, 2);
    }

    #[test]
    fn test_overview_none_for_header_only_sheet() {
        let mut wb = workbook();
        wb.sheets = vec!["Notes".to_string()];
        assert!(wb.overview().is_none());
    }

    #[test]
    fn test_snapshot_deserializes_api_shape() {
        let json = r#"{
            "success": true,
            "data": { "Sheet1": [["Week", "Open Rate"], ["1/1/24", "45%"]] },
            "sheets": ["Sheet1"],
            "lastUpdated": "2024-01-02T00:00:00Z"
        }"#;
        let snap: SheetSnapshot = serde_json::from_str(json).unwrap();
        assert!(snap.success);
        assert_eq!(snap.sheet("Sheet1").unwrap()[1][1], "45%");
        assert_eq!(snap.last_updated.as_deref(), Some("2024-01-02T00:00:00Z"));
        assert!(snap.error.is_none());
    }
}
