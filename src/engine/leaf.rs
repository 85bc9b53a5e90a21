#![forbid(unsafe_code)]

//! Evaluation of a single terminal field

use crate::declaration::Leaf;
use crate::engine::RunContext;
use crate::engine::scheme::{
    run_sanitizer_schemes, run_sanitizers, run_validator_schemes, run_validators,
};
use crate::error::RuleError;
use crate::result::{ErrorMap, LeafResult};
use crate::rules::Subject;
use serde_json::Value;

/// Error key recorded for a required field that is absent from the input
pub const OPTIONAL_ERROR: &str = "optional";

/// Evaluate one leaf against its raw value
///
/// `raw` is `None` when the key is absent from the input. Validation and
/// sanitization are independent: the sanitized value is produced even when a
/// validator fails.
pub(crate) fn process_leaf(
    ctx: RunContext<'_>,
    leaf: &Leaf,
    raw: Option<&Value>,
) -> Result<LeafResult, RuleError> {
    let Some(value) = raw else {
        if leaf.optional {
            return Ok(LeafResult {
                valid: true,
                ..LeafResult::default()
            });
        }
        let mut errors = ErrorMap::new();
        errors.insert(OPTIONAL_ERROR.to_string(), Vec::new());
        return Ok(LeafResult {
            valid: false,
            errors,
            value: None,
            value_sanitized: None,
        });
    };

    if leaf.allow_empty && value.as_str() == Some("") {
        return Ok(LeafResult {
            valid: true,
            errors: ErrorMap::new(),
            value: Some(value.clone()),
            value_sanitized: Some(value.clone()),
        });
    }

    let mut errors = ErrorMap::new();
    let subject = Subject::Value(value);
    run_validators(ctx, &leaf.validators, subject, &mut errors)?;
    run_validator_schemes(ctx, &leaf.validator_schemes, subject, &mut errors)?;

    let sanitized = run_sanitizers(ctx, &leaf.sanitizations, value.clone())?;
    let sanitized = run_sanitizer_schemes(ctx, &leaf.sanitization_schemes, sanitized)?;

    Ok(LeafResult {
        valid: errors.is_empty(),
        errors,
        value: Some(value.clone()),
        value_sanitized: Some(sanitized),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleRegistry;
    use crate::types::Invocation;
    use serde_json::json;

    fn run(leaf: &Leaf, raw: Option<&Value>) -> LeafResult {
        let registry = RuleRegistry::with_builtins();
        let ctx = RunContext {
            registry: &registry,
            parallel: false,
        };
        process_leaf(ctx, leaf, raw).unwrap()
    }

    #[test]
    fn test_required_absent_value() {
        let result = run(&Leaf::new(), None);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[OPTIONAL_ERROR], Vec::<Value>::new());
        assert!(result.value.is_none());
    }

    #[test]
    fn test_optional_absent_value() {
        let leaf = Leaf::new()
            .optional(true)
            .with_sanitization(Invocation::named("dotAdd", Vec::new()));
        let result = run(&leaf, None);
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.value.is_none());
        assert!(result.value_sanitized.is_none());
    }

    #[test]
    fn test_allow_empty_short_circuits() {
        let leaf = Leaf::new()
            .allow_empty(true)
            .with_validator_scheme(Invocation::named("name", Vec::new()))
            .with_sanitization(Invocation::named("dotAdd", Vec::new()));
        let result = run(&leaf, Some(&json!("")));
        assert!(result.valid);
        assert_eq!(result.value_sanitized, Some(json!("")));
    }

    #[test]
    fn test_empty_string_without_allow_empty_is_validated() {
        let leaf = Leaf::new().with_validator_scheme(Invocation::named("text", Vec::new()));
        let result = run(&leaf, Some(&json!("")));
        assert!(!result.valid);
        assert!(result.errors.contains_key("range"));
    }

    #[test]
    fn test_null_is_present() {
        let result = run(&Leaf::new(), Some(&json!(null)));
        assert!(result.valid);
        assert_eq!(result.value, Some(json!(null)));
    }

    #[test]
    fn test_sanitizes_despite_failed_validation() {
        let leaf = Leaf::new()
            .with_validator_scheme(Invocation::named("name", Vec::new()))
            .with_sanitization_scheme(Invocation::named("dotPlus", Vec::new()));
        let result = run(&leaf, Some(&json!("J")));
        assert!(!result.valid);
        assert_eq!(result.errors["range"], vec![json!(2), json!(35)]);
        assert_eq!(result.value, Some(json!("J")));
        assert_eq!(result.value_sanitized, Some(json!("+J.")));
    }

    #[test]
    fn test_sanitizers_run_before_schemes() {
        let leaf = Leaf::new()
            .with_sanitization_scheme(Invocation::named("dotPlus", Vec::new()))
            .with_sanitization(Invocation::named("trim", Vec::new()));
        let result = run(&leaf, Some(&json!("  abc ")));
        assert_eq!(result.value_sanitized, Some(json!("+abc.")));
    }

    #[test]
    fn test_no_rules_passes_through() {
        let result = run(&Leaf::new(), Some(&json!(42)));
        assert!(result.valid);
        assert_eq!(result.value, Some(json!(42)));
        assert_eq!(result.value_sanitized, Some(json!(42)));
    }
}
