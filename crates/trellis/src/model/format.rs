//! Display formatting for cell values and summaries.
//!
//! Field metadata carries .NET-style format strings. The supported subset:
//!
//! | format | meaning | `1234.5` renders as |
//! |---|---|---|
//! | `N`, `N0`..`N15` | grouped, fixed decimals (default 2) | `1,234.50` |
//! | `F`, `F0`.. | fixed decimals (default 2) | `1234.50` |
//! | `C`, `C0`.. | currency, grouped (default 2) | `$1,234.50` |
//! | `P`, `P0`.. | percent of value x 100 (default 2) | `123,450.00%` |
//! | `D`, `D0`.. | integer, zero padded to width | integral values only |
//! | `G`, `G0`.. | general, optional significant digits | `1234.5` |
//! | `0.00`, `#,##0.0` | custom digit pattern | `1234.50`, `1,234.5` |
//!
//! Timestamps accept `d`, `D`, `g`, `G`, `t`, `T`, `s` (US conventions) or
//! a `strftime` pattern containing `%`.

use chrono::NaiveDateTime;
use chrono::format::{Item, StrftimeItems};
use trellis_core::FieldValue;

use crate::error::FormatError;

const MAX_PRECISION: usize = 15;

/// Format a field value for display.
///
/// An empty or missing format renders the raw value. Text that parses as a
/// number or a timestamp is formatted as one; other text, booleans and
/// absent values render raw whatever the format.
pub fn format_value(value: &FieldValue, format: Option<&str>) -> Result<String, FormatError> {
    let Some(format) = format.map(str::trim).filter(|f| !f.is_empty()) else {
        return Ok(value.to_string());
    };

    match value {
        FieldValue::Int(n) => format_number(*n as f64, format),
        FieldValue::Float(n) => format_number(*n, format),
        FieldValue::DateTime(dt) => format_datetime(dt, format),
        FieldValue::Str(text) => {
            if let Ok(n) = text.trim().parse::<f64>() {
                format_number(n, format)
            } else if let Some(dt) = parse_datetime(text) {
                format_datetime(&dt, format)
            } else {
                Ok(text.clone())
            }
        }
        FieldValue::Bool(_) | FieldValue::None => Ok(value.to_string()),
    }
}

/// Format a number with a standard or custom numeric format.
pub fn format_number(value: f64, format: &str) -> Result<String, FormatError> {
    let format = format.trim();
    if format.is_empty() {
        return Ok(general(value, None));
    }
    if format.chars().all(|c| matches!(c, '0' | '#' | ',' | '.')) {
        return custom_pattern(value, format);
    }

    let mut chars = format.chars();
    let Some(specifier) = chars.next() else {
        return Err(FormatError::invalid(format));
    };
    let digits = chars.as_str();
    let precision = if digits.is_empty() {
        None
    } else if digits.chars().all(|c| c.is_ascii_digit()) {
        let p: usize = digits
            .parse()
            .map_err(|_| FormatError::PrecisionOutOfRange(format.to_string()))?;
        if p > MAX_PRECISION {
            return Err(FormatError::PrecisionOutOfRange(format.to_string()));
        }
        Some(p)
    } else {
        return Err(FormatError::invalid(format));
    };

    match specifier.to_ascii_uppercase() {
        'N' => Ok(fixed(value, precision.unwrap_or(2), true)),
        'F' => Ok(fixed(value, precision.unwrap_or(2), false)),
        'C' => {
            let body = fixed(value.abs(), precision.unwrap_or(2), true);
            Ok(if value < 0.0 && body.chars().any(|c| matches!(c, '1'..='9')) {
                format!("-${body}")
            } else {
                format!("${body}")
            })
        }
        'P' => Ok(format!("{}%", fixed(value * 100.0, precision.unwrap_or(2), true))),
        'D' => {
            if value.fract() != 0.0 || !value.is_finite() {
                return Err(FormatError::IntegralRequired {
                    format: format.to_string(),
                    value,
                });
            }
            let width = precision.unwrap_or(0);
            let magnitude = format!("{:0width$}", value.abs() as i128, width = width);
            Ok(if value < 0.0 {
                format!("-{magnitude}")
            } else {
                magnitude
            })
        }
        'G' => Ok(general(value, precision.filter(|p| *p > 0))),
        'E' | 'X' | 'R' => Err(FormatError::invalid(format)),
        _ if is_date_specifier(format) => Err(FormatError::KindMismatch {
            format: format.to_string(),
            kind: "numeric",
        }),
        _ => Err(FormatError::invalid(format)),
    }
}

/// Format a timestamp with a standard date specifier or a `strftime` pattern.
pub fn format_datetime(value: &NaiveDateTime, format: &str) -> Result<String, FormatError> {
    let format = format.trim();
    let pattern = match format {
        "d" => "%-m/%-d/%Y",
        "D" => "%A, %B %-d, %Y",
        "g" => "%-m/%-d/%Y %-I:%M %p",
        "G" => "%-m/%-d/%Y %-I:%M:%S %p",
        "t" => "%-I:%M %p",
        "T" => "%-I:%M:%S %p",
        "s" => "%Y-%m-%dT%H:%M:%S",
        _ if format.contains('%') => format,
        _ => {
            return Err(FormatError::KindMismatch {
                format: format.to_string(),
                kind: "timestamp",
            });
        }
    };

    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(FormatError::invalid(format));
    }
    Ok(value.format_with_items(items.into_iter()).to_string())
}

fn is_date_specifier(format: &str) -> bool {
    matches!(format, "d" | "g" | "t" | "T" | "s") || format.contains('%')
}

/// Lenient timestamp parsing for text columns.
fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    const PATTERNS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %I:%M:%S %p",
        "%m/%d/%Y %I:%M %p",
    ];
    let text = text.trim();
    PATTERNS
        .iter()
        .find_map(|p| NaiveDateTime::parse_from_str(text, p).ok())
}

/// Fixed-point rendering with optional thousands grouping.
fn fixed(value: f64, decimals: usize, grouped: bool) -> String {
    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };

    let int_part = if grouped {
        group_thousands(int_part)
    } else {
        int_part.to_string()
    };

    let negative = value < 0.0 && rendered.chars().any(|c| matches!(c, '1'..='9'));
    let mut out = String::with_capacity(rendered.len() + 4);
    if negative {
        out.push('-');
    }
    out.push_str(&int_part);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// General format: shortest round-trip text, or `precision` significant digits.
fn general(value: f64, precision: Option<usize>) -> String {
    let Some(precision) = precision else {
        return if value == 0.0 { "0".to_string() } else { value.to_string() };
    };
    if value == 0.0 || !value.is_finite() {
        return general(value, None);
    }

    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (precision as i32 - 1 - magnitude).max(0) as usize;
    let rendered = format!("{:.*}", decimals, value);
    let trimmed = if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.')
    } else {
        rendered.as_str()
    };
    trimmed.to_string()
}

/// Custom patterns built from `0`, `#`, `,` and a single `.`.
fn custom_pattern(value: f64, pattern: &str) -> Result<String, FormatError> {
    let (int_pattern, frac_pattern) = match pattern.split_once('.') {
        Some((i, f)) if !f.contains('.') && !f.contains(',') => (i, f),
        Some(_) => return Err(FormatError::invalid(pattern)),
        None => (pattern, ""),
    };

    let grouped = int_pattern.contains(',');
    let min_int_digits = int_pattern.chars().filter(|c| *c == '0').count();
    let required_decimals = frac_pattern.chars().take_while(|c| *c == '0').count();
    let max_decimals = frac_pattern.len();

    let mut body = fixed(value.abs(), max_decimals, false);
    if max_decimals > required_decimals {
        if let Some((int_part, frac_part)) = body.split_once('.') {
            let keep = frac_part.trim_end_matches('0').len().max(required_decimals);
            body = if keep == 0 {
                int_part.to_string()
            } else {
                format!("{int_part}.{}", &frac_part[..keep])
            };
        }
    }

    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (body.clone(), None),
    };
    let int_part = if int_part == "0" && min_int_digits == 0 {
        String::new()
    } else if int_part.len() < min_int_digits {
        format!("{int_part:0>min_int_digits$}")
    } else {
        int_part
    };
    let int_part = if grouped {
        group_thousands(&int_part)
    } else {
        int_part
    };

    let mut out = String::new();
    if value < 0.0 && body.chars().any(|c| matches!(c, '1'..='9')) {
        out.push('-');
    }
    out.push_str(&int_part);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(&frac);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_standard_numeric_formats() {
        assert_eq!(format_number(1234.5, "N2").unwrap(), "1,234.50");
        assert_eq!(format_number(1234.5, "N").unwrap(), "1,234.50");
        assert_eq!(format_number(1234567.0, "N0").unwrap(), "1,234,567");
        assert_eq!(format_number(-1234.5, "n1").unwrap(), "-1,234.5");
        assert_eq!(format_number(1234.5, "F3").unwrap(), "1234.500");
        assert_eq!(format_number(1234.5, "C").unwrap(), "$1,234.50");
        assert_eq!(format_number(-3.0, "C0").unwrap(), "-$3");
        assert_eq!(format_number(0.256, "P1").unwrap(), "25.6%");
        assert_eq!(format_number(42.0, "D5").unwrap(), "00042");
        assert_eq!(format_number(-42.0, "D").unwrap(), "-42");
    }

    #[test]
    fn test_general_format() {
        assert_eq!(format_number(0.0, "").unwrap(), "0");
        assert_eq!(format_number(60.0, "G").unwrap(), "60");
        assert_eq!(format_number(2.5, "").unwrap(), "2.5");
        assert_eq!(format_number(1234.5678, "G5").unwrap(), "1234.6");
        assert_eq!(format_number(0.000123456, "G3").unwrap(), "0.000123");
    }

    #[test]
    fn test_negative_zero_has_no_sign() {
        assert_eq!(format_number(-0.001, "N2").unwrap(), "0.00");
        assert_eq!(format_number(-0.001, "0.00").unwrap(), "0.00");
    }

    #[test]
    fn test_custom_patterns() {
        assert_eq!(format_number(1234.5, "0.00").unwrap(), "1234.50");
        assert_eq!(format_number(1234.5, "#,##0.00").unwrap(), "1,234.50");
        assert_eq!(format_number(7.0, "000").unwrap(), "007");
        assert_eq!(format_number(1.5, "0.##").unwrap(), "1.5");
        assert_eq!(format_number(2.0, "0.##").unwrap(), "2");
        assert_eq!(format_number(0.5, "#.00").unwrap(), ".50");
        assert!(format_number(1.0, "0.0.0").is_err());
    }

    #[test]
    fn test_invalid_numeric_formats() {
        assert!(matches!(
            format_number(1.0, "Q2"),
            Err(FormatError::InvalidSpecifier(_))
        ));
        assert!(matches!(
            format_number(1.0, "N99"),
            Err(FormatError::PrecisionOutOfRange(_))
        ));
        assert!(matches!(
            format_number(1.5, "D"),
            Err(FormatError::IntegralRequired { .. })
        ));
        assert!(matches!(
            format_number(1.0, "g"),
            Ok(_)
        ));
        assert!(matches!(
            format_number(1.0, "t"),
            Err(FormatError::KindMismatch { kind: "numeric", .. })
        ));
    }

    #[test]
    fn test_standard_date_formats() {
        let dt = at(2024, 3, 7, 14, 5, 9);
        assert_eq!(format_datetime(&dt, "d").unwrap(), "3/7/2024");
        assert_eq!(format_datetime(&dt, "D").unwrap(), "Thursday, March 7, 2024");
        assert_eq!(format_datetime(&dt, "g").unwrap(), "3/7/2024 2:05 PM");
        assert_eq!(format_datetime(&dt, "G").unwrap(), "3/7/2024 2:05:09 PM");
        assert_eq!(format_datetime(&dt, "t").unwrap(), "2:05 PM");
        assert_eq!(format_datetime(&dt, "T").unwrap(), "2:05:09 PM");
        assert_eq!(format_datetime(&dt, "s").unwrap(), "2024-03-07T14:05:09");
        assert_eq!(format_datetime(&dt, "%Y/%m").unwrap(), "2024/03");
    }

    #[test]
    fn test_invalid_date_formats() {
        let dt = at(2024, 3, 7, 14, 5, 9);
        assert!(matches!(
            format_datetime(&dt, "N2"),
            Err(FormatError::KindMismatch { kind: "timestamp", .. })
        ));
        assert!(matches!(
            format_datetime(&dt, "%Q"),
            Err(FormatError::InvalidSpecifier(_))
        ));
    }

    #[test]
    fn test_format_value_dispatch() {
        assert_eq!(format_value(&FieldValue::Float(2.5), Some("N2")).unwrap(), "2.50");
        assert_eq!(format_value(&FieldValue::Int(1500), Some("N0")).unwrap(), "1,500");
        assert_eq!(format_value(&FieldValue::Str("12".into()), Some("F1")).unwrap(), "12.0");
        assert_eq!(
            format_value(&FieldValue::Str("2024-03-07 14:05:09".into()), Some("d")).unwrap(),
            "3/7/2024"
        );
        assert_eq!(format_value(&FieldValue::Str("plain".into()), Some("N2")).unwrap(), "plain");
        assert_eq!(format_value(&FieldValue::Bool(true), Some("N2")).unwrap(), "true");
        assert_eq!(format_value(&FieldValue::Float(2.5), None).unwrap(), "2.5");
        assert_eq!(format_value(&FieldValue::Float(2.5), Some("  ")).unwrap(), "2.5");
    }
}
