//! Derived series: week-over-week growth and calendar-month roll-ups.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use newsletter_core::dates::resolve_week_date_at;
use newsletter_core::models::{MonthlyMetrics, WeeklyGrowth, WeeklyMetric};

// ── MonthBucket ───────────────────────────────────────────────────────────────

/// Running totals for the weeks that fall into one month.
#[derive(Debug, Clone)]
struct MonthBucket {
    label: String,
    open_sum: f64,
    click_sum: f64,
    first_subscribers: u64,
    last_subscribers: u64,
    weeks: usize,
}

impl MonthBucket {
    fn new(month_start: NaiveDate, first: &WeeklyMetric) -> Self {
        Self {
            label: month_start.format("%b %Y").to_string(),
            open_sum: 0.0,
            click_sum: 0.0,
            first_subscribers: first.subscribers,
            last_subscribers: first.subscribers,
            weeks: 0,
        }
    }

    fn add_week(&mut self, metric: &WeeklyMetric) {
        self.open_sum += metric.open_rate;
        self.click_sum += metric.click_rate;
        self.last_subscribers = metric.subscribers;
        self.weeks += 1;
    }
}

// ── SeriesAggregator ──────────────────────────────────────────────────────────

/// Stateless helper that derives secondary series from the weekly series.
pub struct SeriesAggregator;

impl SeriesAggregator {
    /// Subscriber change between each week and the one before it.
    ///
    /// The first week has no predecessor and produces no entry.
    pub fn weekly_growth(series: &[WeeklyMetric]) -> Vec<WeeklyGrowth> {
        series
            .windows(2)
            .map(|pair| {
                let growth = pair[1].subscribers as i64 - pair[0].subscribers as i64;
                WeeklyGrowth {
                    week: pair[1].week.clone(),
                    growth,
                    is_positive: growth >= 0,
                }
            })
            .collect()
    }

    /// Group weeks by the calendar month of their resolved date, ascending.
    ///
    /// Growth for a month is its last subscriber count minus the previous
    /// month's last count; the first month compares against its own first
    /// week. Weeks whose label does not resolve to a date are skipped.
    pub fn aggregate_monthly(series: &[WeeklyMetric], today: NaiveDate) -> Vec<MonthlyMetrics> {
        let mut buckets: BTreeMap<(i32, u32), MonthBucket> = BTreeMap::new();

        for metric in series {
            let Some(date) = resolve_week_date_at(&metric.week, today) else {
                tracing::debug!("Skipping \"{}\" in monthly roll-up: no date", metric.week);
                continue;
            };
            let month_start = date.with_day(1).unwrap_or(date);
            buckets
                .entry((date.year(), date.month()))
                .or_insert_with(|| MonthBucket::new(month_start, metric))
                .add_week(metric);
        }

        let mut previous_last: Option<u64> = None;
        buckets
            .into_values()
            .map(|bucket| {
                let baseline = previous_last.unwrap_or(bucket.first_subscribers);
                previous_last = Some(bucket.last_subscribers);
                let weeks = bucket.weeks as f64;
                MonthlyMetrics {
                    month: bucket.label,
                    avg_open_rate: bucket.open_sum / weeks,
                    avg_click_rate: bucket.click_sum / weeks,
                    subscriber_growth: bucket.last_subscribers as i64 - baseline as i64,
                    weeks: bucket.weeks,
                }
            })
            .collect()
    }
}

/// Convenience wrapper around [`SeriesAggregator::weekly_growth`].
pub fn weekly_growth(series: &[WeeklyMetric]) -> Vec<WeeklyGrowth> {
    SeriesAggregator::weekly_growth(series)
}

/// Convenience wrapper around [`SeriesAggregator::aggregate_monthly`].
pub fn aggregate_monthly(series: &[WeeklyMetric], today: NaiveDate) -> Vec<MonthlyMetrics> {
    SeriesAggregator::aggregate_monthly(series, today)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn week(label: &str, open: f64, click: f64, subs: u64) -> WeeklyMetric {
        WeeklyMetric {
            week: label.to_string(),
            open_rate: open,
            click_rate: click,
            subscribers: subs,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ── weekly_growth ────────────────────────────────────────────────────────

    #[test]
    fn test_weekly_growth_empty_and_single() {
        assert!(weekly_growth(&[]).is_empty());
        assert!(weekly_growth(&[week("1/1/24", 0.0, 0.0, 100)]).is_empty());
    }

    #[test]
    fn test_weekly_growth_differences() {
        let series = vec![
            week("1/1/24", 0.0, 0.0, 1000),
            week("1/8/24", 0.0, 0.0, 1050),
            week("1/15/24", 0.0, 0.0, 1020),
            week("1/22/24", 0.0, 0.0, 1020),
        ];
        let growth = weekly_growth(&series);
        assert_eq!(growth.len(), 3);
        assert_eq!(
            growth[0],
            WeeklyGrowth {
                week: "1/8/24".to_string(),
                growth: 50,
                is_positive: true,
            }
        );
        assert_eq!(growth[1].growth, -30);
        assert!(!growth[1].is_positive);
        // No change counts as positive.
        assert_eq!(growth[2].growth, 0);
        assert!(growth[2].is_positive);
    }

    // ── aggregate_monthly ────────────────────────────────────────────────────

    #[test]
    fn test_monthly_empty() {
        assert!(aggregate_monthly(&[], today()).is_empty());
    }

    #[test]
    fn test_monthly_groups_and_labels() {
        let series = vec![
            week("1/1/24", 40.0, 4.0, 1000),
            week("1/8/24", 50.0, 6.0, 1050),
            week("2/5/24", 45.0, 5.0, 1100),
        ];
        let months = aggregate_monthly(&series, today());
        assert_eq!(months.len(), 2);

        assert_eq!(months[0].month, "Jan 2024");
        assert_eq!(months[0].weeks, 2);
        assert!(approx(months[0].avg_open_rate, 45.0));
        assert!(approx(months[0].avg_click_rate, 5.0));
        assert_eq!(months[0].subscriber_growth, 50);

        assert_eq!(months[1].month, "Feb 2024");
        assert_eq!(months[1].weeks, 1);
        assert_eq!(months[1].subscriber_growth, 50);
    }

    #[test]
    fn test_monthly_growth_against_previous_month_end() {
        let series = vec![
            week("1/29/24", 0.0, 0.0, 500),
            week("2/5/24", 0.0, 0.0, 480),
            week("2/12/24", 0.0, 0.0, 470),
        ];
        let months = aggregate_monthly(&series, today());
        assert_eq!(months[0].subscriber_growth, 0);
        assert_eq!(months[1].subscriber_growth, -30);
    }

    #[test]
    fn test_monthly_spans_year_boundary_in_order() {
        let series = vec![
            week("12/25/23", 0.0, 0.0, 10),
            week("1/1/24", 0.0, 0.0, 20),
        ];
        let labels: Vec<String> = aggregate_monthly(&series, today())
            .into_iter()
            .map(|m| m.month)
            .collect();
        assert_eq!(labels, vec!["Dec 2023", "Jan 2024"]);
    }

    #[test]
    fn test_monthly_skips_unresolvable_labels() {
        let series = vec![
            week("Launch week", 90.0, 9.0, 5),
            week("3/4/24", 40.0, 4.0, 100),
        ];
        let months = aggregate_monthly(&series, today());
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].month, "Mar 2024");
        assert!(approx(months[0].avg_open_rate, 40.0));
    }

    #[test]
    fn test_monthly_uses_reference_date_for_short_labels() {
        let january = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let series = vec![week("12/20", 0.0, 0.0, 1), week("1/3", 0.0, 0.0, 2)];
        let labels: Vec<String> = aggregate_monthly(&series, january)
            .into_iter()
            .map(|m| m.month)
            .collect();
        assert_eq!(labels, vec!["Dec 2024", "Jan 2025"]);
    }
}
