//! List command implementation
//!
//! This module implements the `vldtr list` command, which lists every rule
//! the engine would use, per class, marking rules that come from vldtr.toml
//! as custom.

use crate::cli::args::ListFormat;
use crate::cli::common::{EXIT_ERROR, EXIT_PARSE_ERROR, EXIT_SUCCESS};
use crate::engine::Engine;
use crate::error::{ConfigError, RuleError};
use crate::output::{RuleListHumanFormatter, RuleListJsonlFormatter, RuleListing, RuleSource};
use crate::rules::RuleRegistry;
use crate::types::RuleClass;
use std::path::Path;

/// Error type specific to list command
#[derive(Debug, thiserror::Error)]
enum ListError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),
}

/// Run the list command
///
/// # Arguments
///
/// * `config` - Optional configuration file
/// * `format` - Output format (human or JSONL)
///
/// # Returns
///
/// Exit code:
/// - 0: Success
/// - 2: Error
/// - 3: Parse error (invalid TOML configuration)
pub fn run_list(config: Option<&Path>, format: ListFormat) -> i32 {
    match run_list_inner(config, format) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            match e {
                ListError::Config(ConfigError::Parse(_)) => EXIT_PARSE_ERROR,
                _ => EXIT_ERROR,
            }
        }
    }
}

/// Internal implementation of list command
fn run_list_inner(config: Option<&Path>, format: ListFormat) -> Result<(), ListError> {
    let config = super::common::load_config(config)?;
    let overrides = config.overrides()?;
    let engine = Engine::new(overrides.clone());

    let listings = build_listings(engine.registry(), &overrides);

    match format {
        ListFormat::Human => RuleListHumanFormatter::new().write_to_stdout(&listings),
        ListFormat::Jsonl => RuleListJsonlFormatter::new().write_to_stdout(&listings),
    }

    Ok(())
}

/// One listing per registered rule, in class then registration order
fn build_listings(registry: &RuleRegistry, overrides: &RuleRegistry) -> Vec<RuleListing> {
    RuleClass::ALL
        .iter()
        .flat_map(|&class| {
            registry.names(class).into_iter().map(move |name| RuleListing {
                name: name.to_string(),
                class,
                source: if overrides.contains(class, name) {
                    RuleSource::Custom
                } else {
                    RuleSource::Builtin
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_build_listings_builtins_only() {
        let registry = RuleRegistry::with_builtins();
        let listings = build_listings(&registry, &RuleRegistry::new());

        assert_eq!(listings.len(), registry.len());
        assert!(listings.iter().all(|l| l.source == RuleSource::Builtin));
        assert_eq!(listings[0].class, RuleClass::Validator);
        assert_eq!(listings.last().unwrap().class, RuleClass::SanitizerScheme);
    }

    #[test]
    fn test_build_listings_marks_custom() {
        let config = Config::parse(
            r#"
[validator_schemes]
name = [["range", [1, 10]]]
username = [["range", [3, 20]]]
"#,
        )
        .unwrap();
        let overrides = config.overrides().unwrap();
        let engine = Engine::new(overrides.clone());
        let listings = build_listings(engine.registry(), &overrides);

        let find = |name: &str| listings.iter().find(|l| l.name == name).unwrap();
        assert_eq!(find("name").source, RuleSource::Custom);
        assert_eq!(find("username").source, RuleSource::Custom);
        assert_eq!(find("password").source, RuleSource::Builtin);
        assert_eq!(listings.len(), RuleRegistry::with_builtins().len() + 1);
    }
}
