//! Numeric parsing and formatting helpers.
//!
//! Source extracts mix period and comma decimal separators, and the files this
//! pipeline writes use a comma (see [`format_decimal_comma`]). Every helper
//! here treats empty or whitespace-only input as missing rather than as an
//! error.

/// Parses a string as `f64`, returning `None` for invalid or empty strings.
///
/// Only a period is accepted as the decimal separator.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a string as `f64`, accepting a comma as the decimal separator.
///
/// A value with a single comma and no period is read as a decimal comma
/// (`"12,50"` is `12.5`). Values that already use a period parse as usual.
///
/// # Examples
///
/// ```
/// use smb_common::parse_f64_lenient;
///
/// assert_eq!(parse_f64_lenient("12,50"), Some(12.5));
/// assert_eq!(parse_f64_lenient("7.9"), Some(7.9));
/// assert_eq!(parse_f64_lenient("n/a"), None);
/// ```
pub fn parse_f64_lenient(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains(',') && !trimmed.contains('.') && trimmed.matches(',').count() == 1 {
        return parse_f64(&trimmed.replace(',', "."));
    }
    parse_f64(trimmed)
}

/// Parses a string as `i64`, returning `None` for invalid or empty strings.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// Parses a whole number, falling back to a truncated float.
///
/// `"2020"`, `"2020.0"` and `"2020,0"` all yield `2020`.
pub fn parse_i64_lenient(value: &str) -> Option<i64> {
    parse_i64(value).or_else(|| parse_f64_lenient(value).and_then(truncate_to_i64))
}

/// Truncates toward zero, matching integer-cast semantics.
///
/// Returns `None` for values outside the `i64` range or non-finite input.
pub fn truncate_to_i64(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Formats a floating-point number as a string without trailing zeros.
///
/// # Examples
///
/// ```
/// use smb_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.5), "1.5");
/// assert_eq!(format_numeric(10.0), "10");
/// assert_eq!(format_numeric(0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return if s == "-0" { "0".to_string() } else { s };
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Formats a number with a comma as the decimal separator.
///
/// This is the on-disk format for decimal values. It collides with the comma
/// field delimiter on purpose; the CSV writer quotes such fields.
pub fn format_decimal_comma(v: f64) -> String {
    format_numeric(v).replace('.', ",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("  "), None);
        assert_eq!(parse_f64("3.25"), Some(3.25));
        assert_eq!(parse_f64("  3.25  "), Some(3.25));
        assert_eq!(parse_f64("3,25"), None);
        assert_eq!(parse_f64("invalid"), None);
        assert_eq!(parse_f64("NaN"), None);
    }

    #[test]
    fn test_parse_f64_lenient() {
        assert_eq!(parse_f64_lenient("12,50"), Some(12.5));
        assert_eq!(parse_f64_lenient("12.50"), Some(12.5));
        assert_eq!(parse_f64_lenient("5"), Some(5.0));
        assert_eq!(parse_f64_lenient("1,234,5"), None);
        assert_eq!(parse_f64_lenient(""), None);
    }

    #[test]
    fn test_parse_i64_lenient() {
        assert_eq!(parse_i64_lenient("2020"), Some(2020));
        assert_eq!(parse_i64_lenient("2020.0"), Some(2020));
        assert_eq!(parse_i64_lenient("2020,0"), Some(2020));
        assert_eq!(parse_i64_lenient("abc"), None);
    }

    #[test]
    fn test_truncate_to_i64() {
        assert_eq!(truncate_to_i64(7.9), Some(7));
        assert_eq!(truncate_to_i64(-7.9), Some(-7));
        assert_eq!(truncate_to_i64(f64::NAN), None);
        assert_eq!(truncate_to_i64(1e300), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.346, 2), 12.35);
        assert_eq!(round_to(12.5, 2), 12.5);
        assert_eq!(round_to(2.5, 0), 3.0);
    }

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(1.0), "1");
        assert_eq!(format_numeric(1.5), "1.5");
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(-0.0), "0");
    }

    #[test]
    fn test_format_decimal_comma() {
        assert_eq!(format_decimal_comma(12.5), "12,5");
        assert_eq!(format_decimal_comma(12.0), "12");
        assert_eq!(format_decimal_comma(-0.25), "-0,25");
    }

    proptest! {
        #[test]
        fn decimal_comma_output_reparses(cents in -1_000_000_i64..1_000_000) {
            let value = cents as f64 / 100.0;
            let written = format_decimal_comma(value);
            prop_assert_eq!(parse_f64_lenient(&written), Some(value));
        }
    }
}
