#![forbid(unsafe_code)]

//! Core domain types for vldtr
//!
//! Rule names, rule classes and the `(name, options)` invocation pairs that
//! declarations and schemes are written in.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;

/// The four independent rule namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleClass {
    Validator,
    ValidatorScheme,
    Sanitizer,
    SanitizerScheme,
}

impl RuleClass {
    /// All classes, in evaluation order
    pub const ALL: [RuleClass; 4] = [
        RuleClass::Validator,
        RuleClass::ValidatorScheme,
        RuleClass::Sanitizer,
        RuleClass::SanitizerScheme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleClass::Validator => "validator",
            RuleClass::ValidatorScheme => "validator scheme",
            RuleClass::Sanitizer => "sanitizer",
            RuleClass::SanitizerScheme => "sanitizer scheme",
        }
    }
}

impl fmt::Display for RuleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated rule name
///
/// Rule names must be non-empty and contain only ASCII alphanumeric characters,
/// hyphens, and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleName(String);

impl RuleName {
    /// Creates a new RuleName, validating the input
    ///
    /// Returns None if the input is empty or contains invalid characters
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            return None;
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return None;
        }
        Some(RuleName(name))
    }

    /// Name for a built-in rule; the literal must already be well-formed
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(RuleName::new(name).is_some(), "bad built-in name {name}");
        RuleName(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for RuleName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RuleName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RuleName::new(value.clone()).ok_or_else(|| format!("Invalid rule name '{}'", value))
    }
}

impl From<RuleName> for String {
    fn from(name: RuleName) -> Self {
        name.0
    }
}

/// One rule invocation: a rule name plus its positional options
///
/// Deserializes from `"trim"`, `["trim"]` or `["range", [2, 35]]`, and always
/// serializes as the two-element form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "InvocationRepr", into = "(RuleName, Vec<Value>)")]
pub struct Invocation {
    pub name: RuleName,
    pub options: Vec<Value>,
}

impl Invocation {
    pub fn new(name: RuleName, options: Vec<Value>) -> Self {
        Self { name, options }
    }

    /// Builds an invocation from a name known to be well-formed
    ///
    /// Scheme implementations use this for their literal rule names. A
    /// malformed name is kept as-is so that lookup reports it as unknown.
    pub fn named(name: &str, options: Vec<Value>) -> Self {
        Self {
            name: RuleName::new(name).unwrap_or_else(|| RuleName(name.to_string())),
            options,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InvocationRepr {
    Bare(RuleName),
    Single((RuleName,)),
    WithOptions(RuleName, Vec<Value>),
}

impl From<InvocationRepr> for Invocation {
    fn from(repr: InvocationRepr) -> Self {
        match repr {
            InvocationRepr::Bare(name) | InvocationRepr::Single((name,)) => {
                Invocation::new(name, Vec::new())
            }
            InvocationRepr::WithOptions(name, options) => Invocation::new(name, options),
        }
    }
}

impl From<Invocation> for (RuleName, Vec<Value>) {
    fn from(invocation: Invocation) -> Self {
        (invocation.name, invocation.options)
    }
}
