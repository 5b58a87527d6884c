//! Week-label date resolution.
//!
//! Week labels are only ever used as sort keys; the label itself is what gets
//! displayed. Labels come in three shapes:
//!
//! * `M/D/Y` – year given, two-digit years expanded (`< 50` → 20xx, else 19xx)
//! * `M/D`   – year inferred from the reference date, see [`infer_year`]
//! * anything else – free-form parsing, falling back to the epoch so that
//!   unrecognised rows sort first instead of failing the batch.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeDelta};

use crate::normalize::leading_int;

/// Sentinel returned for labels that cannot be resolved (1970-01-01).
pub fn epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Free-form formats tried for labels without `/` separators. `%B` also
/// accepts abbreviated month names when parsing.
const FREE_FORM_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%a, %d %b %Y",
];

const FREE_FORM_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Resolve a week label to a sortable date using the local clock for
/// year inference.
pub fn parse_week_date(label: &str) -> NaiveDate {
    parse_week_date_at(label, Local::now().date_naive())
}

/// Resolve a week label against an explicit reference date, returning
/// [`epoch`] when the label is unrecognised.
pub fn parse_week_date_at(label: &str, today: NaiveDate) -> NaiveDate {
    resolve_week_date_at(label, today).unwrap_or_else(epoch)
}

/// Resolve a week label against an explicit reference date.
///
/// Returns `None` instead of the epoch sentinel so callers can tell
/// "unparseable" apart from a genuine date.
pub fn resolve_week_date_at(label: &str, today: NaiveDate) -> Option<NaiveDate> {
    let parts: Vec<&str> = label.split('/').collect();
    if parts.len() < 2 {
        return parse_free_form(label);
    }

    let month = leading_int(parts[0])?;
    let day = leading_int(parts[1])?;

    let year = if parts.len() >= 3 {
        expand_two_digit_year(leading_int(parts[2])?)
    } else {
        i64::from(infer_year(month, today))
    };

    calendar_date(year, month, day)
}

/// Best-effort year for a `M/D` label.
///
/// Uses the reference year unless `month` (1-based) lies more than two months
/// past the reference month, in which case the label is taken to belong to
/// the previous year (late-year data viewed in January).
pub fn infer_year(month: i64, today: NaiveDate) -> i32 {
    let current_month = i64::from(today.month());
    if month > current_month + 2 {
        today.year() - 1
    } else {
        today.year()
    }
}

fn expand_two_digit_year(year: i64) -> i64 {
    match year {
        0..=49 => 2000 + year,
        50..=99 => 1900 + year,
        _ => year,
    }
}

/// Build a date from 1-based month and day, rolling out-of-range components
/// over into neighbouring months and years (`13/1/2023` → 2024-01-01).
fn calendar_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    let total_months = year.checked_mul(12)?.checked_add(month.checked_sub(1)?)?;
    let y = i32::try_from(total_months.div_euclid(12)).ok()?;
    let m = u32::try_from(total_months.rem_euclid(12) + 1).ok()?;
    let first = NaiveDate::from_ymd_opt(y, m, 1)?;
    first.checked_add_signed(TimeDelta::try_days(day.checked_sub(1)?)?)
}

fn parse_free_form(label: &str) -> Option<NaiveDate> {
    let s = label.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    for fmt in FREE_FORM_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.date());
        }
    }
    for fmt in FREE_FORM_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    tracing::debug!("unrecognised week label \"{}\"", label);
    None
}

// ── Tests ──────────────────────────────────────────────────────────────────────
