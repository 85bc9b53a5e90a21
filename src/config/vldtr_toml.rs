//! Parsing and validation for vldtr.toml configuration files

use crate::engine::{Engine, EngineOptions};
use crate::error::{ConfigError, RuleError};
use crate::rules::RuleRegistry;
use crate::types::{Invocation, RuleName};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration struct for vldtr.toml
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Declarative validator schemes: name to the validators it expands to
    #[serde(default)]
    pub validator_schemes: IndexMap<String, Vec<Invocation>>,

    /// Declarative sanitizer schemes: name to the sanitizers it expands to
    #[serde(default)]
    pub sanitizer_schemes: IndexMap<String, Vec<Invocation>>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        validate_schemes("validator_schemes", &self.validator_schemes)?;
        validate_schemes("sanitizer_schemes", &self.sanitizer_schemes)?;
        Ok(())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            parallel: self.engine.parallel,
        }
    }

    /// Build the override set for the declared schemes
    ///
    /// Each scheme expands to its configured list regardless of the subject.
    /// Overrides replace same-named built-in schemes.
    pub fn overrides(&self) -> Result<RuleRegistry, RuleError> {
        let mut registry = RuleRegistry::new();

        for (name, rules) in &self.validator_schemes {
            let rules = rules.clone();
            registry.register_validator_scheme(name, move |_, _| Ok(rules.clone()))?;
        }

        for (name, rules) in &self.sanitizer_schemes {
            let rules = rules.clone();
            registry.register_sanitizer_scheme(name, move |_, _| Ok(rules.clone()))?;
        }

        Ok(registry)
    }

    /// Build an engine from the built-in rules, these overrides and options
    pub fn engine(&self) -> Result<Engine, RuleError> {
        Ok(Engine::new(self.overrides()?).with_options(self.engine_options()))
    }
}

fn validate_schemes(
    section: &str,
    schemes: &IndexMap<String, Vec<Invocation>>,
) -> Result<(), ConfigError> {
    for (name, rules) in schemes {
        if RuleName::new(name.as_str()).is_none() {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.{}", section, name),
                message: "scheme names may only contain ASCII letters, digits, '-' and '_'"
                    .to_string(),
            });
        }
        if rules.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Scheme '{}' in [{}] expands to no rules",
                name, section
            )));
        }
    }
    Ok(())
}

/// Engine configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Evaluate siblings concurrently
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
        }
    }
}

fn default_parallel() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Subject;
    use crate::types::RuleClass;
    use serde_json::json;

    const VALID_CONFIG: &str = r#"
[engine]
parallel = false

[validator_schemes]
username = [["range", [3, 20]]]
name = [["range", [1, 10]], "isNumber"]

[sanitizer_schemes]
shout = ["trim", "toUpper"]
"#;

    #[test]
    fn test_valid_config_parsing() {
        let config = Config::parse(VALID_CONFIG).unwrap();

        assert!(!config.engine.parallel);
        assert_eq!(config.validator_schemes.len(), 2);
        assert_eq!(
            config.validator_schemes["username"],
            vec![Invocation::named("range", vec![json!(3), json!(20)])]
        );
        assert_eq!(config.validator_schemes["name"][1].name.as_str(), "isNumber");
        assert_eq!(config.sanitizer_schemes["shout"].len(), 2);
    }

    #[test]
    fn test_minimal_config() {
        let config = Config::parse("").unwrap();
        assert!(config.engine.parallel);
        assert!(config.validator_schemes.is_empty());
        assert!(config.sanitizer_schemes.is_empty());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_scheme_name() {
        let invalid = r#"
[validator_schemes]
"user name" = [["range", [3, 20]]]
"#;
        let err = Config::parse(invalid).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("validator_schemes.user name"));
    }

    #[test]
    fn test_empty_scheme_rejected() {
        let invalid = r#"
[sanitizer_schemes]
nothing = []
"#;
        let err = Config::parse(invalid).unwrap_err();
        assert!(err.to_string().contains("expands to no rules"));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result = Config::parse("[rules]\nrange = true\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_overrides_register_schemes() {
        let config = Config::parse(VALID_CONFIG).unwrap();
        let overrides = config.overrides().unwrap();

        assert!(overrides.contains(RuleClass::ValidatorScheme, "username"));
        assert!(overrides.contains(RuleClass::SanitizerScheme, "shout"));
        assert_eq!(overrides.len(), 3);

        let scheme = overrides.validator_schemes().get("username").unwrap();
        let value = json!("anything");
        let expanded = scheme(Subject::Value(&value), &[]).unwrap();
        assert_eq!(expanded, config.validator_schemes["username"]);
    }

    #[test]
    fn test_engine_uses_overrides_and_options() {
        let config = Config::parse(VALID_CONFIG).unwrap();
        let engine = config.engine().unwrap();

        assert!(!engine.options().parallel);
        let value = json!("J");
        let expanded = engine
            .expand_validator_scheme(&Invocation::named("name", Vec::new()), Subject::Value(&value))
            .unwrap();
        assert_eq!(expanded.len(), 2);
        assert!(engine.registry().contains(RuleClass::ValidatorScheme, "password"));
    }
}
