//! Error types for vldtr
//!
//! Configuration and rule errors are fatal: they abort a `run` call and never
//! show up in a result tree. Failed validations are data, recorded in the
//! result tree's error maps.

use crate::types::RuleClass;

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid declaration or configuration contents
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid configuration value
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// JSON parse error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rule-related errors
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// A declared rule has no registered implementation
    #[error("Unknown {class} '{name}'")]
    UnknownRule { class: RuleClass, name: String },

    /// A rule implementation itself failed
    #[error("{class} '{name}' failed: {message}")]
    Failed {
        class: RuleClass,
        name: String,
        message: String,
    },

    /// Malformed rule name
    #[error("Invalid rule name: {0}")]
    InvalidName(String),
}

/// Failure reported by a rule implementation
///
/// Returning this from a validator, sanitizer or scheme aborts the whole run.
/// A validator that merely rejects its input returns `Ok(false)` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RuleFailure {
    pub message: String,
}

impl RuleFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Top-level error type for vldtr
#[derive(Debug, thiserror::Error)]
pub enum VldtrError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rule error
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
