//! Conversion of raw spreadsheet cells into canonical numbers.
//!
//! Both parsers are total: anything that does not start with a number
//! becomes `0`. Only the leading numeric prefix of a cell is read, so
//! `"45.5% (est.)"` still yields `45.5`.

use std::sync::OnceLock;

use regex::Regex;

fn leading_float_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("regex is valid")
    })
}

fn leading_int_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?\d+").expect("regex is valid"))
}

/// Parse the decimal number at the start of `s` (after leading whitespace).
pub fn leading_float(s: &str) -> Option<f64> {
    let m = leading_float_re().find(s.trim_start())?;
    m.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse the integer at the start of `s` (after leading whitespace).
///
/// Values that overflow `i64` are treated as unparseable.
pub fn leading_int(s: &str) -> Option<i64> {
    let m = leading_int_re().find(s.trim_start())?;
    m.as_str().parse::<i64>().ok()
}

/// Normalize a rate cell to a percentage in `[0, 100]`.
///
/// * `"45%"`, `"45"` → `45.0`
/// * `"0.45"` → `45.0`: values strictly between 0 and 1 are taken to be
///   fractions. A genuine `0.5%` rate is therefore read as `50%`.
/// * empty or non-numeric → `0.0`
pub fn parse_percent(raw: &str) -> f64 {
    if raw.is_empty() {
        return 0.0;
    }
    let cleaned = raw.replacen('%', "", 1);
    match leading_float(cleaned.trim()) {
        Some(v) if v > 0.0 && v < 1.0 => v * 100.0,
        Some(v) => v,
        None => 0.0,
    }
}

/// Normalize a count cell, dropping thousands separators.
///
/// * `"1,234"` → `1234`
/// * `"1,234.9"` → `1234` (fraction truncated)
/// * empty or non-numeric → `0`
pub fn parse_number(raw: &str) -> i64 {
    if raw.is_empty() {
        return 0;
    }
    let cleaned = raw.replace(',', "");
    leading_int(cleaned.trim()).unwrap_or(0)
}

/// [`parse_number`] clamped to a non-negative subscriber count.
pub fn parse_count(raw: &str) -> u64 {
    u64::try_from(parse_number(raw)).unwrap_or(0)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
