#![forbid(unsafe_code)]

//! Rule listing formatters
//!
//! This module provides formatters for the `vldtr list` command. It supports
//! both human-readable and JSONL output formats.

use crate::types::RuleClass;
use serde::Serialize;

/// Source of a rule (builtin or custom)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource {
    Builtin,
    Custom,
}

impl RuleSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSource::Builtin => "builtin",
            RuleSource::Custom => "custom",
        }
    }
}

/// One registered rule
#[derive(Debug, Clone)]
pub struct RuleListing {
    pub name: String,
    pub class: RuleClass,
    pub source: RuleSource,
}

/// Human-readable formatter for rule listings
pub struct RuleListHumanFormatter;

impl RuleListHumanFormatter {
    pub fn new() -> Self {
        RuleListHumanFormatter
    }

    /// Format listings grouped by class, in class order
    pub fn format(&self, listings: &[RuleListing]) -> String {
        let mut output = String::new();
        output.push_str(&format!("Rules ({} registered):\n", listings.len()));

        for class in RuleClass::ALL {
            let in_class: Vec<&RuleListing> =
                listings.iter().filter(|l| l.class == class).collect();
            if in_class.is_empty() {
                continue;
            }

            output.push('\n');
            output.push_str(&format!("{}s:\n", capitalize(class.as_str())));
            for listing in in_class {
                match listing.source {
                    RuleSource::Builtin => output.push_str(&format!("  {}\n", listing.name)),
                    RuleSource::Custom => output.push_str(&format!(
                        "  {} ({})\n",
                        listing.name,
                        listing.source.as_str()
                    )),
                }
            }
        }

        output
    }

    /// Write the formatted output to stdout
    pub fn write_to_stdout(&self, listings: &[RuleListing]) {
        print!("{}", self.format(listings));
    }
}

impl Default for RuleListHumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// JSONL output structure for a rule listing
#[derive(Debug, Serialize)]
struct JsonlRuleListing<'a> {
    name: &'a str,
    class: RuleClass,
    source: &'static str,
}

/// JSONL formatter for rule listings
pub struct RuleListJsonlFormatter;

impl RuleListJsonlFormatter {
    pub fn new() -> Self {
        RuleListJsonlFormatter
    }

    /// Format listings as JSONL, one object per rule
    pub fn format(&self, listings: &[RuleListing]) -> String {
        let mut output = String::new();

        for listing in listings {
            let record = JsonlRuleListing {
                name: &listing.name,
                class: listing.class,
                source: listing.source.as_str(),
            };

            if let Ok(json) = serde_json::to_string(&record) {
                output.push_str(&json);
                output.push('\n');
            }
        }

        output
    }

    /// Write the formatted output to stdout
    pub fn write_to_stdout(&self, listings: &[RuleListing]) {
        print!("{}", self.format(listings));
    }
}

impl Default for RuleListJsonlFormatter {
    fn default() -> Self {
        Self::new()
    }
}
