use crate::models::{SummaryStats, WeeklyMetric, NO_WEEK};

/// Number of most recent weeks compared against the window before them.
pub const TREND_WINDOW: usize = 4;

/// How many positions back the subscriber-growth baseline sits.
pub const GROWTH_LOOKBACK: usize = 4;

// ── SummaryCalculator ─────────────────────────────────────────────────────────

/// Stateless summary and trend calculations over an ordered weekly series.
pub struct SummaryCalculator;

impl SummaryCalculator {
    /// Derive [`SummaryStats`] from a chronologically ordered series.
    ///
    /// Returns [`SummaryStats::empty`] for an empty series. Histories shorter
    /// than the trend or growth windows shrink the windows instead of failing.
    pub fn calculate(data: &[WeeklyMetric]) -> SummaryStats {
        let Some(last) = data.last() else {
            return SummaryStats::empty();
        };

        let current_subscribers = last.subscribers;
        let baseline = data[Self::baseline_index(data.len())].subscribers;
        let subscriber_growth = current_subscribers as i64 - baseline as i64;
        let subscriber_growth_percent = if baseline > 0 {
            subscriber_growth as f64 / baseline as f64 * 100.0
        } else {
            0.0
        };

        SummaryStats {
            current_subscribers,
            subscriber_growth,
            subscriber_growth_percent,
            avg_open_rate: mean(data, |d| d.open_rate),
            avg_click_rate: mean(data, |d| d.click_rate),
            open_rate_trend: Self::trend(data, |d| d.open_rate),
            click_rate_trend: Self::trend(data, |d| d.click_rate),
            total_weeks: data.len(),
            best_open_rate_week: best_week(data, |d| d.open_rate),
            best_click_rate_week: best_week(data, |d| d.click_rate),
        }
    }

    /// Index of the growth baseline: `GROWTH_LOOKBACK` positions before the
    /// last element, clamped to the start.
    pub fn baseline_index(len: usize) -> usize {
        len.saturating_sub(GROWTH_LOOKBACK + 1)
    }

    /// Split the series into `(recent, previous)` trailing windows.
    ///
    /// `recent` is the last [`TREND_WINDOW`] elements; `previous` the up to
    /// [`TREND_WINDOW`] elements right before them (empty when the series is
    /// no longer than one window).
    pub fn trend_windows(data: &[WeeklyMetric]) -> (&[WeeklyMetric], &[WeeklyMetric]) {
        let n = data.len();
        let recent_start = n.saturating_sub(TREND_WINDOW);
        let previous_start = n.saturating_sub(2 * TREND_WINDOW);
        (&data[recent_start..], &data[previous_start..recent_start])
    }

    /// Mean of the recent window minus mean of the previous window, or `0.0`
    /// when there is no previous window.
    pub fn trend(data: &[WeeklyMetric], metric: impl Fn(&WeeklyMetric) -> f64) -> f64 {
        let (recent, previous) = Self::trend_windows(data);
        if previous.is_empty() {
            return 0.0;
        }
        mean(recent, &metric) - mean(previous, &metric)
    }
}

/// Convenience wrapper around [`SummaryCalculator::calculate`].
pub fn calculate_summary_stats(data: &[WeeklyMetric]) -> SummaryStats {
    SummaryCalculator::calculate(data)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn mean(data: &[WeeklyMetric], metric: impl Fn(&WeeklyMetric) -> f64) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().map(metric).sum::<f64>() / data.len() as f64
}

/// Label of the first element holding the maximum value of `metric`.
fn best_week(data: &[WeeklyMetric], metric: impl Fn(&WeeklyMetric) -> f64) -> String {
    let mut best: Option<(&WeeklyMetric, f64)> = None;
    for item in data {
        let value = metric(item);
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((item, value)),
        }
    }
    best.map(|(item, _)| item.week.clone())
        .unwrap_or_else(|| NO_WEEK.to_string())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
