//! Value coercion at the query-result boundary
//!
//! Query endpoints return loosely typed JSON: 64-bit integers and decimals
//! frequently arrive as strings, dates always do. These helpers convert a
//! raw [`Value`] into the numeric or textual form a chart value needs.
//! Unconvertible input becomes `NaN` rather than an error, so a single odd
//! cell shows up as a gap in the chart instead of failing the whole query.

use serde_json::Value;
use viz_house_shared::{parse_timestamp_millis, ColumnType, XValue};

/// Coerce an x-axis cell according to its declared column type
pub fn coerce_x(value: &Value, column_type: ColumnType) -> XValue {
    match column_type {
        ColumnType::Date => XValue::Timestamp(parse_date(value)),
        ColumnType::Number => XValue::Number(parse_float(value)),
        ColumnType::String => XValue::Text(to_text(value)),
    }
}

/// Lenient float parse: the longest numeric prefix of the textual form
pub fn parse_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_float_str(s),
        _ => f64::NAN,
    }
}

pub fn parse_float_str(raw: &str) -> f64 {
    let trimmed = raw.trim_start();
    let end = numeric_prefix_len(trimmed);
    if end == 0 {
        return infinity_prefix(trimmed).unwrap_or(f64::NAN);
    }
    trimmed[..end].parse().unwrap_or(f64::NAN)
}

/// Strict numeric conversion of a whole cell.
///
/// Empty strings and `null` convert to 0, booleans to 0/1, and any string
/// that is not entirely a number to NaN.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => string_to_number(s),
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn string_to_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    if let Some(radix_value) = radix_literal(trimmed) {
        return radix_value;
    }
    if let Some(inf) = infinity_prefix(trimmed) {
        let sign_len = usize::from(trimmed.starts_with(['+', '-']));
        return if trimmed.len() == sign_len + "Infinity".len() {
            inf
        } else {
            f64::NAN
        };
    }

    if numeric_prefix_len(trimmed) == trimmed.len() {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Convert a date cell to milliseconds since the Unix epoch.
///
/// Strings go through [`parse_timestamp_millis`]; numbers are already
/// epoch milliseconds, and booleans count as 0 or 1 ms like numbers do.
pub fn parse_date(value: &Value) -> f64 {
    match value {
        Value::String(s) => parse_timestamp_millis(s).map_or(f64::NAN, |ms| ms as f64),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Textual form of a cell, with integral numbers printed without a fraction
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e21 => {
                format!("{f:.0}")
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Length of the longest prefix shaped like `[+-]digits[.digits][e[+-]digits]`
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }

    if digits == 0 {
        return 0;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    i
}

fn infinity_prefix(s: &str) -> Option<f64> {
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    rest.starts_with("Infinity").then_some(sign * f64::INFINITY)
}

fn radix_literal(s: &str) -> Option<f64> {
    let (radix, digits) = match s.get(..2)? {
        "0x" | "0X" => (16, &s[2..]),
        "0o" | "0O" => (8, &s[2..]),
        "0b" | "0B" => (2, &s[2..]),
        _ => return None,
    };
    // digits only, no sign; wide literals lose precision rather than overflow
    let value = digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    });
    Some(match value {
        Some(v) if !digits.is_empty() => v,
        _ => f64::NAN,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float(&json!("42.5")), 42.5);
        assert_eq!(parse_float(&json!(7)), 7.0);
        assert_eq!(parse_float(&json!("  -3e2kb")), -300.0);
        assert_eq!(parse_float(&json!("12px")), 12.0);
        assert_eq!(parse_float(&json!(".5")), 0.5);
        assert_eq!(parse_float(&json!("5.")), 5.0);
        assert_eq!(parse_float(&json!("1e")), 1.0);
        assert_eq!(parse_float(&json!("-Infinity")), f64::NEG_INFINITY);
        assert!(parse_float(&json!("abc")).is_nan());
        assert!(parse_float(&json!("")).is_nan());
        assert!(parse_float(&json!(null)).is_nan());
        assert!(parse_float(&json!(true)).is_nan());
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(&json!("12")), 12.0);
        assert_eq!(to_number(&json!(" 1.5e1 ")), 15.0);
        assert_eq!(to_number(&json!("")), 0.0);
        assert_eq!(to_number(&json!(null)), 0.0);
        assert_eq!(to_number(&json!(true)), 1.0);
        assert_eq!(to_number(&json!("0x1f")), 31.0);
        assert_eq!(to_number(&json!("Infinity")), f64::INFINITY);
        assert!(to_number(&json!("12px")).is_nan());
        assert!(to_number(&json!("inf")).is_nan());
        assert!(to_number(&json!("Infinityx")).is_nan());
        assert!(to_number(&json!([1])).is_nan());
    }

    #[test]
    fn test_radix_literals_are_unsigned() {
        assert_eq!(to_number(&json!("0b101")), 5.0);
        assert_eq!(to_number(&json!("0o17")), 15.0);
        assert_eq!(to_number(&json!("0x20000000000000000")), 2f64.powi(65));
        assert!(to_number(&json!("0x+1f")).is_nan());
        assert!(to_number(&json!("0x-1")).is_nan());
        assert!(to_number(&json!("0x")).is_nan());
        assert!(to_number(&json!("0b2")).is_nan());
    }

    #[test]
    fn test_parse_date_bool_is_millis() {
        assert_eq!(parse_date(&json!(true)), 1.0);
        assert_eq!(parse_date(&json!(false)), 0.0);
        assert!(parse_date(&json!({"t": 1})).is_nan());
    }

    #[test]
    fn test_parse_date_only_is_utc_midnight() {
        assert_eq!(parse_date(&json!("2020-01-01")), 1_577_836_800_000.0);
    }

    #[test]
    fn test_parse_date_time_forms() {
        assert_eq!(
            parse_date(&json!("2020-01-01 00:00:01")),
            1_577_836_801_000.0
        );
        assert_eq!(
            parse_date(&json!("2020-01-01T00:00:00.250Z")),
            1_577_836_800_250.0
        );
        assert_eq!(
            parse_date(&json!("2020-01-01T02:00:00+02:00")),
            1_577_836_800_000.0
        );
        assert_eq!(parse_date(&json!(1_000)), 1_000.0);
        assert!(parse_date(&json!("yesterday")).is_nan());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(&json!("mon")), "mon");
        assert_eq!(to_text(&json!(3)), "3");
        assert_eq!(to_text(&json!(3.0)), "3");
        assert_eq!(to_text(&json!(2.5)), "2.5");
        assert_eq!(to_text(&json!(null)), "null");
        assert_eq!(to_text(&json!(false)), "false");
    }

    #[test]
    fn test_coerce_x() {
        assert_eq!(
            coerce_x(&json!("42.5"), ColumnType::Number),
            XValue::Number(42.5)
        );
        assert_eq!(
            coerce_x(&json!("2020-01-01"), ColumnType::Date),
            XValue::Timestamp(1_577_836_800_000.0)
        );
        assert_eq!(
            coerce_x(&json!(17), ColumnType::String),
            XValue::Text("17".to_string())
        );
    }
}
