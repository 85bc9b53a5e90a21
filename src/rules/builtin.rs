#![forbid(unsafe_code)]

//! Built-in rules shipped with every engine
//!
//! These are the defaults that caller overrides are merged over. Numeric rules
//! coerce their input the way form back ends do (see [`crate::rules::coerce`]),
//! so `"12"` and `12` are treated alike.

use crate::error::RuleFailure;
use crate::rules::coerce::{
    option_f64, option_str, option_truthy, parse_float, str_to_number, to_display_string,
    to_number,
};
use crate::rules::rule::{
    SanitizerFn, SanitizerSchemeFn, Subject, ValidatorFn, ValidatorSchemeFn,
};
use crate::types::Invocation;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::{Value, json};
use std::sync::Arc;

type ValidatorImpl = fn(Subject<'_>, &[Value]) -> Result<bool, RuleFailure>;
type ValidatorSchemeImpl = fn(Subject<'_>, &[Value]) -> Result<Vec<Invocation>, RuleFailure>;
type SanitizerImpl = fn(&Value, &[Value]) -> Result<Value, RuleFailure>;
type SanitizerSchemeImpl = fn(&Value, &[Value]) -> Result<Vec<Invocation>, RuleFailure>;

const VALIDATORS: &[(&str, ValidatorImpl)] = &[
    ("range", range),
    ("between", between),
    ("isNumber", is_number),
    ("isNumberPositive", is_number_positive),
    ("isTime", is_time),
    ("isDate", is_date),
    ("matches", matches_pattern),
    ("validMin", valid_min),
    ("invalidMax", invalid_max),
];

const VALIDATOR_SCHEMES: &[(&str, ValidatorSchemeImpl)] = &[
    ("name", name_scheme),
    ("password", password_scheme),
    ("text", text_scheme),
    ("boolean", boolean_scheme),
];

const SANITIZERS: &[(&str, SanitizerImpl)] = &[
    ("trim", trim),
    ("dotAdd", dot_add),
    ("plusAdd", plus_add),
    ("toInt", to_int),
    ("toLower", to_lower),
    ("toUpper", to_upper),
];

const SANITIZER_SCHEMES: &[(&str, SanitizerSchemeImpl)] = &[("dotPlus", dot_plus)];

pub(crate) fn validators() -> Vec<(&'static str, ValidatorFn)> {
    VALIDATORS
        .iter()
        .map(|&(name, rule)| (name, Arc::new(rule) as ValidatorFn))
        .collect()
}

pub(crate) fn validator_schemes() -> Vec<(&'static str, ValidatorSchemeFn)> {
    VALIDATOR_SCHEMES
        .iter()
        .map(|&(name, rule)| (name, Arc::new(rule) as ValidatorSchemeFn))
        .collect()
}

pub(crate) fn sanitizers() -> Vec<(&'static str, SanitizerFn)> {
    SANITIZERS
        .iter()
        .map(|&(name, rule)| (name, Arc::new(rule) as SanitizerFn))
        .collect()
}

pub(crate) fn sanitizer_schemes() -> Vec<(&'static str, SanitizerSchemeFn)> {
    SANITIZER_SCHEMES
        .iter()
        .map(|&(name, rule)| (name, Arc::new(rule) as SanitizerSchemeFn))
        .collect()
}

// Validators

/// `range(min, max)`: string length in characters, or array length
fn range(subject: Subject<'_>, options: &[Value]) -> Result<bool, RuleFailure> {
    let len = match subject.as_value() {
        Some(Value::String(s)) => s.chars().count(),
        Some(Value::Array(items)) => items.len(),
        _ => return Ok(false),
    };
    let len = len as f64;
    Ok(len >= option_f64(options, 0) && len <= option_f64(options, 1))
}

/// `between(min, max)`: inclusive bounds on the parsed number
fn between(subject: Subject<'_>, options: &[Value]) -> Result<bool, RuleFailure> {
    let Some(value) = subject.as_value() else {
        return Ok(false);
    };
    let number = parse_float(value);
    Ok(number >= option_f64(options, 0) && number <= option_f64(options, 1))
}

/// `isNumber(strict)`: strict mode rejects trailing garbage such as `"12px"`
fn is_number(subject: Subject<'_>, options: &[Value]) -> Result<bool, RuleFailure> {
    let Some(value) = subject.as_value() else {
        return Ok(false);
    };
    Ok(!coerce_number(value, option_truthy(options, 0)).is_nan())
}

fn is_number_positive(subject: Subject<'_>, options: &[Value]) -> Result<bool, RuleFailure> {
    let Some(value) = subject.as_value() else {
        return Ok(false);
    };
    Ok(!coerce_number(value, option_truthy(options, 0)).is_nan() && parse_float(value) > 0.0)
}

fn coerce_number(value: &Value, strict: bool) -> f64 {
    if strict {
        to_number(value)
    } else {
        parse_float(value)
    }
}

/// `isTime`: `HH:MM:SS` with HH in 0..=24 and MM, SS in 0..=60
fn is_time(subject: Subject<'_>, _options: &[Value]) -> Result<bool, RuleFailure> {
    let Some(s) = subject.as_str() else {
        return Ok(false);
    };
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Ok(false);
    }

    Ok(parts.iter().enumerate().all(|(index, part)| {
        let number = str_to_number(part);
        let max = if index == 0 { 24.0 } else { 60.0 };
        !number.is_nan() && (0.0..=max).contains(&number)
    }))
}

/// `isDate`: a calendar date or date-time, or a numeric timestamp
fn is_date(subject: Subject<'_>, _options: &[Value]) -> Result<bool, RuleFailure> {
    Ok(match subject.as_value() {
        Some(Value::Number(n)) => n.as_f64().is_some_and(f64::is_finite),
        Some(Value::String(s)) => parses_as_date(s.trim()),
        _ => false,
    })
}

fn parses_as_date(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(s, "%m/%d/%Y").is_ok()
}

/// `matches(pattern)`: regular expression search on a string
fn matches_pattern(subject: Subject<'_>, options: &[Value]) -> Result<bool, RuleFailure> {
    let pattern = option_str(options, 0)
        .ok_or_else(|| RuleFailure::new("expected a pattern string as the first option"))?;
    let regex = Regex::new(pattern)
        .map_err(|e| RuleFailure::new(format!("invalid pattern '{}': {}", pattern, e)))?;
    Ok(subject.as_str().is_some_and(|s| regex.is_match(s)))
}

/// `validMin(min)`: at least `min` children of the group are valid
///
/// Children are scanned in declaration order and the scan stops as soon as
/// the count is reached, so a group with no children never passes.
fn valid_min(subject: Subject<'_>, options: &[Value]) -> Result<bool, RuleFailure> {
    let group = subject
        .as_group()
        .ok_or_else(|| RuleFailure::new("validMin only applies to groups"))?;
    let mut remaining = option_f64(options, 0);
    for node in group.keys.values() {
        if node.valid() {
            remaining -= 1.0;
        }
        if remaining < 1.0 {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `invalidMax(max)`: at most `max` children of the group are invalid
fn invalid_max(subject: Subject<'_>, options: &[Value]) -> Result<bool, RuleFailure> {
    let group = subject
        .as_group()
        .ok_or_else(|| RuleFailure::new("invalidMax only applies to groups"))?;
    let invalid = group.keys.len() - group.valid_children();
    Ok(invalid as f64 <= option_f64(options, 0))
}

// Validator schemes

fn name_scheme(_subject: Subject<'_>, _options: &[Value]) -> Result<Vec<Invocation>, RuleFailure> {
    Ok(vec![Invocation::named("range", vec![json!(2), json!(35)])])
}

fn password_scheme(
    _subject: Subject<'_>,
    _options: &[Value],
) -> Result<Vec<Invocation>, RuleFailure> {
    Ok(vec![Invocation::named("range", vec![json!(6), json!(50)])])
}

fn text_scheme(_subject: Subject<'_>, _options: &[Value]) -> Result<Vec<Invocation>, RuleFailure> {
    Ok(vec![Invocation::named("range", vec![json!(1), json!(150)])])
}

fn boolean_scheme(
    _subject: Subject<'_>,
    _options: &[Value],
) -> Result<Vec<Invocation>, RuleFailure> {
    Ok(vec![
        Invocation::named("isNumber", Vec::new()),
        Invocation::named("between", vec![json!(0), json!(1)]),
    ])
}

// Sanitizers

fn trim(value: &Value, _options: &[Value]) -> Result<Value, RuleFailure> {
    Ok(match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other.clone(),
    })
}

fn dot_add(value: &Value, _options: &[Value]) -> Result<Value, RuleFailure> {
    Ok(Value::String(format!("{}.", to_display_string(value))))
}

/// `plusAdd(side)`: `"left"` prepends, `"right"` appends, anything else is a no-op
fn plus_add(value: &Value, options: &[Value]) -> Result<Value, RuleFailure> {
    let side = option_str(options, 0);
    Ok(Value::String(format!(
        "{}{}{}",
        if side == Some("left") { "+" } else { "" },
        to_display_string(value),
        if side == Some("right") { "+" } else { "" },
    )))
}

fn to_int(value: &Value, _options: &[Value]) -> Result<Value, RuleFailure> {
    let number = parse_float(value);
    if !number.is_finite() {
        return Ok(value.clone());
    }
    let truncated = number.trunc();
    // Outside the i64 range the truncated value stays a float
    let bound = -(i64::MIN as f64);
    if (-bound..bound).contains(&truncated) {
        Ok(Value::from(truncated as i64))
    } else {
        Ok(Value::from(truncated))
    }
}

fn to_lower(value: &Value, _options: &[Value]) -> Result<Value, RuleFailure> {
    Ok(match value {
        Value::String(s) => Value::String(s.to_lowercase()),
        other => other.clone(),
    })
}

fn to_upper(value: &Value, _options: &[Value]) -> Result<Value, RuleFailure> {
    Ok(match value {
        Value::String(s) => Value::String(s.to_uppercase()),
        other => other.clone(),
    })
}

// Sanitizer schemes

fn dot_plus(_value: &Value, _options: &[Value]) -> Result<Vec<Invocation>, RuleFailure> {
    Ok(vec![
        Invocation::named("plusAdd", vec![json!("left")]),
        Invocation::named("dotAdd", Vec::new()),
    ])
}
