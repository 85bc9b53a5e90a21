#![forbid(unsafe_code)]

//! Scheme expansion and primitive rule invocation
//!
//! A scheme is resolved into its concrete rule list at evaluation time and the
//! list is run through the same machinery as directly declared rules.

use crate::engine::RunContext;
use crate::error::{RuleError, RuleFailure};
use crate::result::ErrorMap;
use crate::rules::Subject;
use crate::types::{Invocation, RuleClass};
use rayon::prelude::*;
use serde_json::Value;

/// Expand one validator scheme invocation against the current subject
pub(crate) fn expand_validator_scheme(
    ctx: RunContext<'_>,
    invocation: &Invocation,
    subject: Subject<'_>,
) -> Result<Vec<Invocation>, RuleError> {
    let scheme = ctx
        .registry
        .validator_schemes()
        .get(invocation.name.as_str())?;
    let expanded = scheme(subject, &invocation.options)
        .map_err(|failure| failed(RuleClass::ValidatorScheme, invocation, failure))?;
    log::trace!(
        "validator scheme '{}' expanded to {} rule(s)",
        invocation.name,
        expanded.len()
    );
    Ok(expanded)
}

/// Expand one sanitizer scheme invocation against the current value
pub(crate) fn expand_sanitizer_scheme(
    ctx: RunContext<'_>,
    invocation: &Invocation,
    value: &Value,
) -> Result<Vec<Invocation>, RuleError> {
    let scheme = ctx
        .registry
        .sanitizer_schemes()
        .get(invocation.name.as_str())?;
    let expanded = scheme(value, &invocation.options)
        .map_err(|failure| failed(RuleClass::SanitizerScheme, invocation, failure))?;
    log::trace!(
        "sanitizer scheme '{}' expanded to {} rule(s)",
        invocation.name,
        expanded.len()
    );
    Ok(expanded)
}

/// Run a list of validators, recording each failure in `errors`
///
/// Members of the list may be evaluated concurrently. Failures are recorded
/// afterwards in list order, so `errors` never depends on completion order.
pub(crate) fn run_validators(
    ctx: RunContext<'_>,
    invocations: &[Invocation],
    subject: Subject<'_>,
    errors: &mut ErrorMap,
) -> Result<(), RuleError> {
    let call = |invocation: &Invocation| -> Result<bool, RuleError> {
        let validator = ctx.registry.validators().get(invocation.name.as_str())?;
        validator(subject, &invocation.options)
            .map_err(|failure| failed(RuleClass::Validator, invocation, failure))
    };

    let outcomes: Vec<bool> = if ctx.parallel && invocations.len() > 1 {
        invocations.par_iter().map(call).collect::<Result<_, _>>()?
    } else {
        invocations.iter().map(call).collect::<Result<_, _>>()?
    };

    for (invocation, passed) in invocations.iter().zip(outcomes) {
        if !passed {
            errors.insert(invocation.name.to_string(), invocation.options.clone());
        }
    }
    Ok(())
}

/// Expand each validator scheme in order and run what it expands to
pub(crate) fn run_validator_schemes(
    ctx: RunContext<'_>,
    schemes: &[Invocation],
    subject: Subject<'_>,
    errors: &mut ErrorMap,
) -> Result<(), RuleError> {
    for scheme in schemes {
        let expanded = expand_validator_scheme(ctx, scheme, subject)?;
        run_validators(ctx, &expanded, subject, errors)?;
    }
    Ok(())
}

/// Thread `value` through each sanitizer in order
pub(crate) fn run_sanitizers(
    ctx: RunContext<'_>,
    invocations: &[Invocation],
    value: Value,
) -> Result<Value, RuleError> {
    invocations.iter().try_fold(value, |value, invocation| {
        let sanitizer = ctx.registry.sanitizers().get(invocation.name.as_str())?;
        sanitizer(&value, &invocation.options)
            .map_err(|failure| failed(RuleClass::Sanitizer, invocation, failure))
    })
}

/// Expand each sanitizer scheme in order and thread the value through it
pub(crate) fn run_sanitizer_schemes(
    ctx: RunContext<'_>,
    schemes: &[Invocation],
    value: Value,
) -> Result<Value, RuleError> {
    schemes.iter().try_fold(value, |value, scheme| {
        let expanded = expand_sanitizer_scheme(ctx, scheme, &value)?;
        run_sanitizers(ctx, &expanded, value)
    })
}

fn failed(class: RuleClass, invocation: &Invocation, failure: RuleFailure) -> RuleError {
    RuleError::Failed {
        class,
        name: invocation.name.to_string(),
        message: failure.message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleRegistry;
    use serde_json::json;

    fn ctx(registry: &RuleRegistry) -> RunContext<'_> {
        RunContext {
            registry,
            parallel: false,
        }
    }

    #[test]
    fn test_expand_builtin_validator_scheme() {
        let registry = RuleRegistry::with_builtins();
        let value = json!("J");
        let expanded = expand_validator_scheme(
            ctx(&registry),
            &Invocation::named("password", Vec::new()),
            Subject::Value(&value),
        )
        .unwrap();
        assert_eq!(
            expanded,
            vec![Invocation::named("range", vec![json!(6), json!(50)])]
        );
    }

    #[test]
    fn test_dynamic_scheme_sees_subject() {
        let mut registry = RuleRegistry::with_builtins();
        registry
            .register_validator_scheme("short", |subject, _| {
                let len = subject.as_str().map_or(0, |s| s.len());
                Ok(if len > 3 {
                    vec![Invocation::named("range", vec![json!(0), json!(3)])]
                } else {
                    Vec::new()
                })
            })
            .unwrap();

        let mut errors = ErrorMap::new();
        let long = json!("abcdef");
        run_validator_schemes(
            ctx(&registry),
            &[Invocation::named("short", Vec::new())],
            Subject::Value(&long),
            &mut errors,
        )
        .unwrap();
        assert_eq!(errors["range"], vec![json!(0), json!(3)]);

        let mut errors = ErrorMap::new();
        let short = json!("ab");
        run_validator_schemes(
            ctx(&registry),
            &[Invocation::named("short", Vec::new())],
            Subject::Value(&short),
            &mut errors,
        )
        .unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unknown_expanded_rule() {
        let mut registry = RuleRegistry::with_builtins();
        registry
            .register_sanitizer_scheme("broken", |_, _| {
                Ok(vec![Invocation::named("noSuchSanitizer", Vec::new())])
            })
            .unwrap();

        let err = run_sanitizer_schemes(
            ctx(&registry),
            &[Invocation::named("broken", Vec::new())],
            json!("x"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RuleError::UnknownRule {
                class: RuleClass::Sanitizer,
                ..
            }
        ));
    }

    #[test]
    fn test_errors_in_declaration_order() {
        let registry = RuleRegistry::with_builtins();
        let mut errors = ErrorMap::new();
        let value = json!("abc");
        let invocations = vec![
            Invocation::named("isNumber", Vec::new()),
            Invocation::named("range", vec![json!(5), json!(9)]),
            Invocation::named("isTime", Vec::new()),
        ];
        let parallel = RunContext {
            registry: &registry,
            parallel: true,
        };
        run_validators(parallel, &invocations, Subject::Value(&value), &mut errors).unwrap();

        let names: Vec<&str> = errors.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["isNumber", "range", "isTime"]);
    }

    #[test]
    fn test_rule_failure_is_fatal() {
        let mut registry = RuleRegistry::new();
        registry
            .register_validator("remote", |_, _| Err(RuleFailure::new("timed out")))
            .unwrap();

        let mut errors = ErrorMap::new();
        let value = json!(1);
        let err = run_validators(
            ctx(&registry),
            &[Invocation::named("remote", Vec::new())],
            Subject::Value(&value),
            &mut errors,
        )
        .unwrap_err();
        match err {
            RuleError::Failed { name, message, .. } => {
                assert_eq!(name, "remote");
                assert_eq!(message, "timed out");
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_sanitizers_thread_value() {
        let registry = RuleRegistry::with_builtins();
        let value = run_sanitizers(
            ctx(&registry),
            &[
                Invocation::named("plusAdd", vec![json!("left")]),
                Invocation::named("dotAdd", Vec::new()),
            ],
            json!("abc"),
        )
        .unwrap();
        assert_eq!(value, json!("+abc."));
    }
}
