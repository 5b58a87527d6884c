//! Plain-text and JSON rendering of an analysis.

use std::fmt::Write as _;
use std::str::FromStr;

use newsletter_core::formatting::{
    format_compact_count, format_count, format_percent, format_signed_count, format_trend,
};
use newsletter_data::analysis::AnalysisResult;
use serde_json::json;

// ── View ───────────────────────────────────────────────────────────────────────

/// Which part of the analysis to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Summary,
    Weekly,
    Monthly,
    Growth,
    Overview,
}

impl FromStr for View {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "summary" => Ok(View::Summary),
            "weekly" => Ok(View::Weekly),
            "monthly" => Ok(View::Monthly),
            "growth" => Ok(View::Growth),
            "overview" => Ok(View::Overview),
            other => anyhow::bail!("unknown view: {}", other),
        }
    }
}

// ── Rendering ──────────────────────────────────────────────────────────────────

/// Render `analysis` for `view`, as pretty JSON when `json` is set.
pub fn render(analysis: &AnalysisResult, view: View, json: bool) -> anyhow::Result<String> {
    if json {
        return render_json(analysis, view);
    }
    Ok(match view {
        View::Summary => render_summary(analysis),
        View::Weekly => render_weekly(analysis),
        View::Monthly => render_monthly(analysis),
        View::Growth => render_growth(analysis),
        View::Overview => render_overview(analysis),
    })
}

fn render_json(analysis: &AnalysisResult, view: View) -> anyhow::Result<String> {
    let value = match view {
        View::Summary => json!({
            "sheet": analysis.sheet,
            "lastUpdated": analysis.last_updated,
            "summary": analysis.summary,
        }),
        View::Weekly => json!({ "sheet": analysis.sheet, "series": analysis.series }),
        View::Monthly => json!({ "sheet": analysis.sheet, "monthly": analysis.monthly }),
        View::Growth => json!({ "sheet": analysis.sheet, "weeklyGrowth": analysis.weekly_growth }),
        View::Overview => json!({
            "overview": analysis.overview,
            "metadata": analysis.metadata,
        }),
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

fn header(analysis: &AnalysisResult) -> String {
    let mut out = format!(
        "Newsletter dashboard: {}",
        analysis.sheet.as_deref().unwrap_or("(table)")
    );
    if let Some(updated) = &analysis.last_updated {
        let _ = write!(out, " (updated {})", updated);
    }
    out.push('\n');
    out
}

fn render_summary(analysis: &AnalysisResult) -> String {
    let s = &analysis.summary;
    let mut out = header(analysis);

    if s.total_weeks == 0 {
        out.push_str("No weekly data found.\n");
        return out;
    }

    let growth = format!(
        "{} ({})",
        format_signed_count(s.subscriber_growth),
        format_percent(s.subscriber_growth_percent)
    );
    let rows = [
        ("Subscribers", format_count(s.current_subscribers as i64), growth),
        (
            "Avg open rate",
            format_percent(s.avg_open_rate),
            format_trend(s.open_rate_trend),
        ),
        (
            "Avg click rate",
            format_percent(s.avg_click_rate),
            format_trend(s.click_rate_trend),
        ),
        ("Weeks tracked", s.total_weeks.to_string(), String::new()),
        ("Best open week", s.best_open_rate_week.clone(), String::new()),
        ("Best click week", s.best_click_rate_week.clone(), String::new()),
    ];
    for (label, value, detail) in rows {
        let line = format!("{:<16} {:>10}  {}", label, value, detail);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn render_weekly(analysis: &AnalysisResult) -> String {
    let mut out = header(analysis);
    let _ = writeln!(
        out,
        "{:<14} {:>9} {:>9} {:>12}",
        "Week", "Open", "Click", "Subscribers"
    );
    for m in &analysis.series {
        let _ = writeln!(
            out,
            "{:<14} {:>9} {:>9} {:>12}",
            m.week,
            format_percent(m.open_rate),
            format_percent(m.click_rate),
            format_count(m.subscribers as i64)
        );
    }
    out
}

fn render_monthly(analysis: &AnalysisResult) -> String {
    let mut out = header(analysis);
    let _ = writeln!(
        out,
        "{:<10} {:>9} {:>9} {:>10} {:>6}",
        "Month", "Open", "Click", "Growth", "Weeks"
    );
    for m in &analysis.monthly {
        let _ = writeln!(
            out,
            "{:<10} {:>9} {:>9} {:>10} {:>6}",
            m.month,
            format_percent(m.avg_open_rate),
            format_percent(m.avg_click_rate),
            format_signed_count(m.subscriber_growth),
            m.weeks
        );
    }
    out
}

fn render_growth(analysis: &AnalysisResult) -> String {
    let mut out = header(analysis);
    let _ = writeln!(out, "{:<14} {:>10}", "Week", "Growth");
    for g in &analysis.weekly_growth {
        let _ = writeln!(out, "{:<14} {:>10}", g.week, format_signed_count(g.growth));
    }
    out
}

fn render_overview(analysis: &AnalysisResult) -> String {
    let mut out = header(analysis);
    match &analysis.overview {
        Some(o) => {
            let rows = format_compact_count(o.total_rows as u64);
            let _ = writeln!(out, "{:<16} {:>8}", "Total rows", rows);
            let _ = writeln!(out, "{:<16} {:>8}", "Columns", o.columns);
            let _ = writeln!(out, "{:<16} {:>8}", "Sheets", o.sheets);
        }
        None => out.push_str("No sheet data.\n"),
    }
    let meta = &analysis.metadata;
    let _ = writeln!(out, "{:<16} {:>8}", "Weeks parsed", meta.weeks_parsed);
    if meta.rows_dropped > 0 {
        let _ = writeln!(out, "{:<16} {:>8}", "Rows dropped", meta.rows_dropped);
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
