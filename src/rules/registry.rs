#![forbid(unsafe_code)]

//! Rule registry for managing named rule implementations
//!
//! The RuleRegistry holds four independent namespaces (validators, validator
//! schemes, sanitizers, sanitizer schemes). An engine builds its registry once,
//! from the built-in defaults plus caller overrides, and never mutates it
//! afterwards.

use crate::error::{RuleError, RuleFailure};
use crate::rules::builtin;
use crate::rules::rule::{
    SanitizerFn, SanitizerSchemeFn, Subject, ValidatorFn, ValidatorSchemeFn,
};
use crate::types::{Invocation, RuleClass, RuleName};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// One namespace of rules, keyed by name in registration order
#[derive(Clone)]
pub struct RuleSet<T> {
    class: RuleClass,
    rules: IndexMap<RuleName, T>,
}

impl<T> RuleSet<T> {
    fn new(class: RuleClass) -> Self {
        Self {
            class,
            rules: IndexMap::new(),
        }
    }

    /// Insert a rule, replacing any rule of the same name
    fn insert(&mut self, name: RuleName, rule: T) {
        self.rules.insert(name, rule);
    }

    /// Look up a rule by name
    ///
    /// # Errors
    ///
    /// Returns `RuleError::UnknownRule` if nothing is registered under `name`.
    pub fn get(&self, name: &str) -> Result<&T, RuleError> {
        self.rules.get(name).ok_or_else(|| RuleError::UnknownRule {
            class: self.class,
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(RuleName::as_str)
    }

    pub fn class(&self) -> RuleClass {
        self.class
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Shallow merge: every rule in `other` replaces the same-named rule here
    fn merge(&mut self, other: RuleSet<T>) {
        for (name, rule) in other.rules {
            self.rules.insert(name, rule);
        }
    }
}

/// Registry of all rule implementations available to an engine
#[derive(Clone)]
pub struct RuleRegistry {
    validators: RuleSet<ValidatorFn>,
    validator_schemes: RuleSet<ValidatorSchemeFn>,
    sanitizers: RuleSet<SanitizerFn>,
    sanitizer_schemes: RuleSet<SanitizerSchemeFn>,
}

impl RuleRegistry {
    /// Create a new empty registry
    ///
    /// An empty registry is also the shape of an override set.
    pub fn new() -> Self {
        Self {
            validators: RuleSet::new(RuleClass::Validator),
            validator_schemes: RuleSet::new(RuleClass::ValidatorScheme),
            sanitizers: RuleSet::new(RuleClass::Sanitizer),
            sanitizer_schemes: RuleSet::new(RuleClass::SanitizerScheme),
        }
    }

    /// Create a registry pre-populated with the built-in rules
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, rule) in builtin::validators() {
            registry.validators.insert(RuleName::from_static(name), rule);
        }
        for (name, rule) in builtin::validator_schemes() {
            registry
                .validator_schemes
                .insert(RuleName::from_static(name), rule);
        }
        for (name, rule) in builtin::sanitizers() {
            registry.sanitizers.insert(RuleName::from_static(name), rule);
        }
        for (name, rule) in builtin::sanitizer_schemes() {
            registry
                .sanitizer_schemes
                .insert(RuleName::from_static(name), rule);
        }
        registry
    }

    /// Layer `overrides` on top of this registry, class by class
    ///
    /// A same-named override replaces the existing rule; nothing is merged
    /// recursively.
    pub fn merge(mut self, overrides: RuleRegistry) -> Self {
        self.validators.merge(overrides.validators);
        self.validator_schemes.merge(overrides.validator_schemes);
        self.sanitizers.merge(overrides.sanitizers);
        self.sanitizer_schemes.merge(overrides.sanitizer_schemes);
        self
    }

    /// Register a validator
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidName` if `name` is not a valid rule name.
    pub fn register_validator<F>(&mut self, name: &str, rule: F) -> Result<(), RuleError>
    where
        F: Fn(Subject<'_>, &[Value]) -> Result<bool, RuleFailure> + Send + Sync + 'static,
    {
        let name = parse_name(name)?;
        self.validators.insert(name, Arc::new(rule));
        Ok(())
    }

    /// Register a validator scheme
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidName` if `name` is not a valid rule name.
    pub fn register_validator_scheme<F>(&mut self, name: &str, rule: F) -> Result<(), RuleError>
    where
        F: Fn(Subject<'_>, &[Value]) -> Result<Vec<Invocation>, RuleFailure>
            + Send
            + Sync
            + 'static,
    {
        let name = parse_name(name)?;
        self.validator_schemes.insert(name, Arc::new(rule));
        Ok(())
    }

    /// Register a sanitizer
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidName` if `name` is not a valid rule name.
    pub fn register_sanitizer<F>(&mut self, name: &str, rule: F) -> Result<(), RuleError>
    where
        F: Fn(&Value, &[Value]) -> Result<Value, RuleFailure> + Send + Sync + 'static,
    {
        let name = parse_name(name)?;
        self.sanitizers.insert(name, Arc::new(rule));
        Ok(())
    }

    /// Register a sanitizer scheme
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidName` if `name` is not a valid rule name.
    pub fn register_sanitizer_scheme<F>(&mut self, name: &str, rule: F) -> Result<(), RuleError>
    where
        F: Fn(&Value, &[Value]) -> Result<Vec<Invocation>, RuleFailure> + Send + Sync + 'static,
    {
        let name = parse_name(name)?;
        self.sanitizer_schemes.insert(name, Arc::new(rule));
        Ok(())
    }

    pub fn validators(&self) -> &RuleSet<ValidatorFn> {
        &self.validators
    }

    pub fn validator_schemes(&self) -> &RuleSet<ValidatorSchemeFn> {
        &self.validator_schemes
    }

    pub fn sanitizers(&self) -> &RuleSet<SanitizerFn> {
        &self.sanitizers
    }

    pub fn sanitizer_schemes(&self) -> &RuleSet<SanitizerSchemeFn> {
        &self.sanitizer_schemes
    }

    /// Check whether a rule of the given class is registered
    pub fn contains(&self, class: RuleClass, name: &str) -> bool {
        match class {
            RuleClass::Validator => self.validators.contains(name),
            RuleClass::ValidatorScheme => self.validator_schemes.contains(name),
            RuleClass::Sanitizer => self.sanitizers.contains(name),
            RuleClass::SanitizerScheme => self.sanitizer_schemes.contains(name),
        }
    }

    /// Names registered under one class, in registration order
    pub fn names(&self, class: RuleClass) -> Vec<&str> {
        match class {
            RuleClass::Validator => self.validators.names().collect(),
            RuleClass::ValidatorScheme => self.validator_schemes.names().collect(),
            RuleClass::Sanitizer => self.sanitizers.names().collect(),
            RuleClass::SanitizerScheme => self.sanitizer_schemes.names().collect(),
        }
    }

    /// Total number of rules across all classes
    pub fn len(&self) -> usize {
        self.validators.len()
            + self.validator_schemes.len()
            + self.sanitizers.len()
            + self.sanitizer_schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("validators", &self.validators.names().collect::<Vec<_>>())
            .field(
                "validator_schemes",
                &self.validator_schemes.names().collect::<Vec<_>>(),
            )
            .field("sanitizers", &self.sanitizers.names().collect::<Vec<_>>())
            .field(
                "sanitizer_schemes",
                &self.sanitizer_schemes.names().collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn parse_name(name: &str) -> Result<RuleName, RuleError> {
    RuleName::new(name).ok_or_else(|| RuleError::InvalidName(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_registry() {
        let registry = RuleRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_with_builtins() {
        let registry = RuleRegistry::with_builtins();
        assert!(registry.contains(RuleClass::Validator, "range"));
        assert!(registry.contains(RuleClass::Validator, "validMin"));
        assert!(registry.contains(RuleClass::ValidatorScheme, "name"));
        assert!(registry.contains(RuleClass::Sanitizer, "dotAdd"));
        assert!(registry.contains(RuleClass::SanitizerScheme, "dotPlus"));
        assert!(!registry.contains(RuleClass::Sanitizer, "range"));
    }

    #[test]
    fn test_lookup_unknown_rule() {
        let registry = RuleRegistry::with_builtins();
        let err = registry.validator_schemes().get("emailFree").err().unwrap();
        match err {
            RuleError::UnknownRule { class, name } => {
                assert_eq!(class, RuleClass::ValidatorScheme);
                assert_eq!(name, "emailFree");
            }
            other => panic!("Expected UnknownRule, got {:?}", other),
        }
    }

    #[test]
    fn test_namespaces_are_independent() {
        let mut registry = RuleRegistry::new();
        registry
            .register_validator("shared", |_, _| Ok(true))
            .unwrap();

        assert!(registry.contains(RuleClass::Validator, "shared"));
        assert!(!registry.contains(RuleClass::ValidatorScheme, "shared"));
        assert!(!registry.contains(RuleClass::Sanitizer, "shared"));
        assert!(!registry.contains(RuleClass::SanitizerScheme, "shared"));
    }

    #[test]
    fn test_register_invalid_name() {
        let mut registry = RuleRegistry::new();
        let result = registry.register_sanitizer("not valid", |v, _| Ok(v.clone()));
        assert!(matches!(result, Err(RuleError::InvalidName(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_merge_overrides_replace_defaults() {
        let mut overrides = RuleRegistry::new();
        overrides
            .register_validator("range", |_, _| Ok(true))
            .unwrap();
        overrides
            .register_validator("testValidator", |_, _| Ok(false))
            .unwrap();

        let defaults = RuleRegistry::with_builtins();
        let before = defaults.validators().len();
        let merged = defaults.merge(overrides);

        // One new name, one replacement
        assert_eq!(merged.validators().len(), before + 1);

        let range = merged.validators().get("range").unwrap();
        let short = json!("J");
        assert!(range(Subject::Value(&short), &[json!(2), json!(35)]).unwrap());
    }

    #[test]
    fn test_merge_keeps_other_classes() {
        let mut overrides = RuleRegistry::new();
        overrides
            .register_sanitizer("dotAdd", |v, _| Ok(v.clone()))
            .unwrap();

        let merged = RuleRegistry::with_builtins().merge(overrides);
        assert!(merged.contains(RuleClass::SanitizerScheme, "dotPlus"));
        assert!(merged.contains(RuleClass::Validator, "isTime"));

        let dot_add = merged.sanitizers().get("dotAdd").unwrap();
        assert_eq!(dot_add(&json!("abc"), &[]).unwrap(), json!("abc"));
    }

    #[test]
    fn test_names_in_registration_order() {
        let mut registry = RuleRegistry::new();
        registry.register_validator("b", |_, _| Ok(true)).unwrap();
        registry.register_validator("a", |_, _| Ok(true)).unwrap();
        assert_eq!(registry.names(RuleClass::Validator), vec!["b", "a"]);
        assert!(registry.names(RuleClass::Sanitizer).is_empty());
    }

    #[test]
    fn test_debug_lists_names() {
        let mut registry = RuleRegistry::new();
        registry.register_validator("custom", |_, _| Ok(true)).unwrap();
        let debug = format!("{:?}", registry);
        assert!(debug.contains("custom"));
    }
}
