//! Field normalizers for raw loan records.
//!
//! Every function here is total: malformed input resolves to `None` instead
//! of an error. What a `None` becomes (a null, a default, or a failed run) is
//! decided by the field's null policy in `schema::FIELD_RULES`.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit run pattern is valid"));

/// Parse a decimal number, `None` on failure or non-finite values
pub fn parse_numeric(raw: Option<&str>) -> Option<f64> {
    let value = raw?.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Parse a percentage such as `12.5%`; the `%` is optional
pub fn parse_percentage(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    parse_numeric(Some(raw.strip_suffix('%').unwrap_or(raw)))
}

/// First maximal run of ASCII digits in `raw`
fn first_digit_run(raw: &str) -> Option<&str> {
    DIGIT_RUN.find(raw).map(|m| m.as_str())
}

/// Month count of a term such as ` 36 months`.
///
/// Returns `None` when no representable digit run exists; the caller decides
/// that this aborts the run.
pub fn parse_term_months(raw: Option<&str>) -> Option<i32> {
    first_digit_run(raw?)?.parse::<i32>().ok()
}

/// Employment length in whole years.
///
/// `< 1 year` is 0, `10+ years` is 10, anything else takes its first integer
/// token. `None` when there is no usable integer.
pub fn parse_emp_years(raw: Option<&str>) -> Option<i32> {
    match raw? {
        "< 1 year" => Some(0),
        "10+ years" => Some(10),
        other => first_digit_run(other)?.parse::<i32>().ok(),
    }
}

/// Parse a `Mon-YYYY` issue date to the first day of that month
pub fn parse_month_year(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    let (month, year) = raw.split_once('-')?;
    if month.len() != 3 || year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(&format!("01-{month}-{year}"), "%d-%b-%Y").ok()
}

/// Categorical passthrough.
///
/// Values are kept as received, including case and surrounding whitespace.
/// An empty field is treated as missing.
pub fn passthrough(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.is_empty())
}
