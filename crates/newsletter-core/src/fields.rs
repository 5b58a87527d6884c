//! Header-based column detection.
//!
//! Spreadsheet authors name their columns freely ("Open Rate", "opens %",
//! "Audience size"), so each semantic field is matched by substring against
//! the lower-cased, trimmed header text. The first matching column wins.

use serde::{Deserialize, Serialize};

/// The semantic columns a newsletter sheet is expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Week,
    OpenRate,
    ClickRate,
    Subscribers,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Week => "week",
            Field::OpenRate => "openRate",
            Field::ClickRate => "clickRate",
            Field::Subscribers => "subscribers",
        }
    }
}

/// Field → header substrings, checked in order.
pub const FIELD_RULES: &[(Field, &[&str])] = &[
    (Field::Week, &["week"]),
    (Field::OpenRate, &["open"]),
    (Field::ClickRate, &["click"]),
    (Field::Subscribers, &["subscrib", "subs", "audience", "list"]),
];

/// Column index per field; `None` when no header matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedColumns {
    pub week: Option<usize>,
    pub open_rate: Option<usize>,
    pub click_rate: Option<usize>,
    pub subscribers: Option<usize>,
}

impl DetectedColumns {
    pub fn get(&self, field: Field) -> Option<usize> {
        match field {
            Field::Week => self.week,
            Field::OpenRate => self.open_rate,
            Field::ClickRate => self.click_rate,
            Field::Subscribers => self.subscribers,
        }
    }

    fn set(&mut self, field: Field, index: usize) {
        let slot = match field {
            Field::Week => &mut self.week,
            Field::OpenRate => &mut self.open_rate,
            Field::ClickRate => &mut self.click_rate,
            Field::Subscribers => &mut self.subscribers,
        };
        *slot = Some(index);
    }

    /// Fields for which no header matched, in rule order.
    pub fn missing(&self) -> Vec<Field> {
        FIELD_RULES
            .iter()
            .map(|(field, _)| *field)
            .filter(|field| self.get(*field).is_none())
            .collect()
    }

    /// Cell text for `field` in `row`, or `""` when the column is missing or
    /// the row is too short.
    pub fn cell<'a, S: AsRef<str>>(&self, row: &'a [S], field: Field) -> &'a str {
        self.get(field)
            .and_then(|idx| row.get(idx))
            .map(|cell| cell.as_ref())
            .unwrap_or("")
    }
}

/// Map a header row to the column index of every known field.
pub fn detect_columns<S: AsRef<str>>(headers: &[S]) -> DetectedColumns {
    let normalised: Vec<String> = headers
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect();

    let mut columns = DetectedColumns::default();
    for (field, needles) in FIELD_RULES {
        let found = normalised
            .iter()
            .position(|header| needles.iter().any(|needle| header.contains(needle)));
        if let Some(idx) = found {
            columns.set(*field, idx);
        }
    }
    columns
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_standard_headers() {
        let cols = detect_columns(&["Week", "Open Rate", "Click Rate", "Subscribers"]);
        assert_eq!(cols.week, Some(0));
        assert_eq!(cols.open_rate, Some(1));
        assert_eq!(cols.click_rate, Some(2));
        assert_eq!(cols.subscribers, Some(3));
        assert!(cols.missing().is_empty());
    }

    #[test]
    fn test_detect_is_case_and_whitespace_insensitive() {
        let cols = detect_columns(&["  WEEK OF ", "OPENS %", "Clicks", "AUDIENCE"]);
        assert_eq!(cols.week, Some(0));
        assert_eq!(cols.open_rate, Some(1));
        assert_eq!(cols.click_rate, Some(2));
        assert_eq!(cols.subscribers, Some(3));
    }

    #[test]
    fn test_subscriber_aliases() {
        assert_eq!(detect_columns(&["Total subs"]).subscribers, Some(0));
        assert_eq!(detect_columns(&["Mailing List"]).subscribers, Some(0));
        assert_eq!(detect_columns(&["Subscribed"]).subscribers, Some(0));
    }

    #[test]
    fn test_first_match_wins() {
        let cols = detect_columns(&["Date", "Unique Opens", "Open Rate", "Week"]);
        assert_eq!(cols.open_rate, Some(1));
        assert_eq!(cols.week, Some(3));
    }

    #[test]
    fn test_one_header_can_satisfy_several_fields() {
        // "Week opened" contains both "week" and "open"; both fields point at it.
        let cols = detect_columns(&["Week opened"]);
        assert_eq!(cols.week, Some(0));
        assert_eq!(cols.open_rate, Some(0));
    }

    #[test]
    fn test_missing_columns_reported_in_rule_order() {
        let cols = detect_columns(&["Week", "Notes"]);
        assert_eq!(
            cols.missing(),
            vec![Field::OpenRate, Field::ClickRate, Field::Subscribers]
        );
    }

    #[test]
    fn test_empty_header_row() {
        let cols = detect_columns::<&str>(&[]);
        assert_eq!(cols, DetectedColumns::default());
        assert_eq!(cols.missing().len(), 4);
    }

    #[test]
    fn test_cell_lookup_handles_short_rows_and_missing_columns() {
        let cols = detect_columns(&["Week", "Open", "Click", "Subscribers"]);
        let row = vec!["1/1/24".to_string(), "45%".to_string()];
        assert_eq!(cols.cell(&row, Field::Week), "1/1/24");
        assert_eq!(cols.cell(&row, Field::OpenRate), "45%");
        assert_eq!(cols.cell(&row, Field::Subscribers), "");

        let none = DetectedColumns::default();
        assert_eq!(none.cell(&row, Field::Week), "");
    }
}
