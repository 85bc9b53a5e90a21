//! Loose value coercions used by the built-in rules
//!
//! Form input arrives as strings, so numeric rules coerce the way browsers and
//! JavaScript back ends do: `"12px"` parses as 12 with [`parse_float`], while
//! [`to_number`] insists on the whole string being numeric.

use serde_json::Value;

/// Leading-prefix float parse; NaN when no number prefix exists
pub fn parse_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_float_str(s),
        _ => f64::NAN,
    }
}

/// Strict numeric conversion; NaN unless the whole value is a number
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::String(s) => str_to_number(s),
        _ => f64::NAN,
    }
}

/// Strict conversion of a string; blank strings are zero
pub fn str_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(number) = radix_literal(trimmed) {
        return number;
    }
    match numeric_prefix_len(trimmed) {
        Some(len) if len == trimmed.len() => parse_prefix(trimmed, len),
        _ => f64::NAN,
    }
}

/// `0x`/`0o`/`0b` literals, unsigned; `None` when there is no such prefix
fn radix_literal(s: &str) -> Option<f64> {
    let radix = match s.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &s[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    Some(
        digits
            .chars()
            .try_fold(0.0_f64, |acc, c| {
                c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
            })
            .unwrap_or(f64::NAN),
    )
}

pub fn parse_float_str(s: &str) -> f64 {
    let trimmed = s.trim_start();
    match numeric_prefix_len(trimmed) {
        Some(len) => parse_prefix(trimmed, len),
        None => f64::NAN,
    }
}

fn parse_prefix(s: &str, len: usize) -> f64 {
    let prefix = &s[..len];
    let unsigned = prefix.trim_start_matches(['+', '-']);
    if unsigned == "Infinity" {
        return if prefix.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    prefix.parse().unwrap_or(f64::NAN)
}

/// Length of the longest decimal literal at the start of `s`
fn numeric_prefix_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return Some(end + "Infinity".len());
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - end - 1;
        if digits + frac_digits > 0 {
            digits += frac_digits;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    Some(end)
}

/// Truthiness of a rule option
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String form used when sanitizers concatenate onto a value
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{}", f),
            _ => n.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(to_display_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Numeric option at `index`; NaN when missing so comparisons fail
pub fn option_f64(options: &[Value], index: usize) -> f64 {
    options.get(index).map(to_number).unwrap_or(f64::NAN)
}

pub fn option_truthy(options: &[Value], index: usize) -> bool {
    options.get(index).is_some_and(truthy)
}

pub fn option_str(options: &[Value], index: usize) -> Option<&str> {
    options.get(index).and_then(Value::as_str)
}
