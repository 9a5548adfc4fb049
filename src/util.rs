// Utility helpers for cell coercion, year extraction and number formatting.
//
// Every stage of the pipeline sees cells as untyped strings. This module
// centralizes the different "is this a number?" rules so the rest of the code
// can pick the one it needs by name.
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

// Leading numeric prefix, the way a lenient float parser reads `"12.5 km"`.
static FLOAT_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").unwrap());

static PURE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d*\.?\d+$").unwrap());

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());

/// Lenient float parsing: skips leading whitespace and reads the longest
/// numeric prefix, ignoring whatever follows (`"3 years"` reads as `3`).
///
/// Returns `None` when the cell does not start with a number at all.
pub fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let m = FLOAT_PREFIX_RE.find(s)?;
    m.as_str().parse::<f64>().ok()
}

/// Chart coercion: lenient parse, anything non-numeric becomes `0`.
pub fn coerce_number(s: &str) -> f64 {
    parse_float(s).unwrap_or(0.0)
}

/// Statistics coercion: thousands separators are stripped before the lenient
/// parse. `None` means the cell carries no number.
pub fn parse_cell(s: &str) -> Option<f64> {
    let s = s.replace(',', "");
    parse_float(&s).filter(|v| v.is_finite())
}

/// Strict whole-cell numeric test used by range detection.
///
/// Commas are stripped and the trimmed remainder must parse completely.
/// Blank cells are neither text nor numbers and return `false`.
pub fn is_numeric_cell(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return false;
    }
    let s = s.replace(',', "");
    // `str::parse` accepts "inf"/"nan", which are text for our purposes.
    matches!(s.parse::<f64>(), Ok(v) if v.is_finite())
}

/// Pattern test for a plain number (`-12`, `3.5`, `.5`, `1,200`).
///
/// Unlike [`parse_float`] this rejects cells such as `"3 years"` that only
/// begin with a number.
pub fn is_pure_number(s: &str) -> bool {
    let s = s.trim().replace(',', "");
    PURE_NUMBER_RE.is_match(&s)
}

pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// First four-digit year (1900-2099) that appears in a label.
pub fn extract_year(label: &str) -> Option<i32> {
    YEAR_RE
        .find(label)
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

/// The label with its first year removed and trimmed, e.g. `"Ene 2021"` ->
/// `"Ene"`. Labels without a year come back trimmed.
pub fn strip_year(label: &str) -> String {
    YEAR_RE.replace(label, "").trim().to_string()
}

pub fn average(v: &[f64]) -> f64 {
    // Returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Population standard deviation.
pub fn std_dev(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let mean = average(v);
    let variance = v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / v.len() as f64;
    variance.sqrt()
}

pub fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

/// Two-decimal rounding rendered without trailing zeros (`30`, `12.5`,
/// `0.33`).
pub fn format_plain(n: f64) -> String {
    let r = round2(n);
    // Avoid printing "-0" for tiny negatives.
    if r == 0.0 {
        return "0".to_string();
    }
    format!("{}", r)
}

/// Signed one-decimal percentage, `+` for non-negative values.
pub fn format_percent(n: f64) -> String {
    format!("{:+.1}%", n)
}

/// Two-decimal amount with thousands separators (`1,234,567.89`).
pub fn format_total(n: f64) -> String {
    let cents = (n.abs() * 100.0).round() as i64;
    let sign = if n < 0.0 && cents != 0 { "-" } else { "" };
    format!(
        "{}{}.{:02}",
        sign,
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

pub fn format_count(n: usize) -> String {
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_parse_reads_numeric_prefix() {
        assert_eq!(parse_float("12.5 km"), Some(12.5));
        assert_eq!(parse_float("  -3"), Some(-3.0));
        assert_eq!(parse_float("1,234"), Some(1.0));
        assert_eq!(parse_float("abc"), None);
        assert_eq!(parse_float(""), None);
        assert_eq!(coerce_number("abc"), 0.0);
    }

    #[test]
    fn stat_cells_strip_thousands_separators() {
        assert_eq!(parse_cell("1,234.5"), Some(1234.5));
        assert_eq!(parse_cell("n/d"), None);
    }

    #[test]
    fn numeric_cell_requires_whole_string() {
        assert!(is_numeric_cell("2020"));
        assert!(is_numeric_cell(" 1,200 "));
        assert!(!is_numeric_cell("Indicador"));
        assert!(!is_numeric_cell("3 years"));
        assert!(!is_numeric_cell(""));
        assert!(!is_numeric_cell("nan"));
    }

    #[test]
    fn pure_number_rejects_trailing_text() {
        assert!(is_pure_number("-12.5"));
        assert!(is_pure_number("1,000"));
        assert!(is_pure_number(".5"));
        assert!(!is_pure_number("3 years"));
        assert!(!is_pure_number(""));
    }

    #[test]
    fn years_and_periods() {
        assert_eq!(extract_year("Ene 2021"), Some(2021));
        assert_eq!(extract_year("T1-1999"), Some(1999));
        assert_eq!(extract_year("Total 2150"), None);
        assert_eq!(extract_year("12021"), None);
        assert_eq!(strip_year("Ene 2021"), "Ene");
        assert_eq!(strip_year("2021"), "");
    }

    #[test]
    fn formatting() {
        assert_eq!(format_plain(30.0), "30");
        assert_eq!(format_plain(12.346), "12.35");
        assert_eq!(format_plain(0.1), "0.1");
        assert_eq!(format_percent(50.0), "+50.0%");
        assert_eq!(format_percent(-33.333), "-33.3%");
        assert_eq!(format_percent(0.0), "+0.0%");
        assert_eq!(format_total(1234567.891), "1,234,567.89");
        assert_eq!(format_total(-1500.0), "-1,500.00");
        assert_eq!(format_total(-0.001), "0.00");
        assert_eq!(format_count(12500), "12,500");
    }

    #[test]
    fn dispersion() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(std_dev(&[10.0, 10.0]), 0.0);
        assert!((std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-9);
    }
}
