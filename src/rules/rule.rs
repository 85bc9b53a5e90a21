#![forbid(unsafe_code)]

//! Rule callables and the subject they are evaluated against

use crate::error::RuleFailure;
use crate::result::GroupResult;
use crate::types::Invocation;
use serde_json::Value;
use std::sync::Arc;

/// What a validator or validator scheme is looking at
///
/// Leaf rules see the raw scalar; group-level rules see the group result with
/// every child already settled.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Value(&'a Value),
    Group(&'a GroupResult),
}

impl<'a> Subject<'a> {
    pub fn as_value(&self) -> Option<&'a Value> {
        match self {
            Subject::Value(value) => Some(value),
            Subject::Group(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn as_group(&self) -> Option<&'a GroupResult> {
        match self {
            Subject::Group(group) => Some(group),
            Subject::Value(_) => None,
        }
    }
}

/// `(subject, options) -> passed`
///
/// Implementations are `Send + Sync` so a tier can be evaluated in parallel.
/// They may block (a remote uniqueness check, say); timeouts are the
/// implementation's business.
pub type ValidatorFn = Arc<dyn Fn(Subject<'_>, &[Value]) -> Result<bool, RuleFailure> + Send + Sync>;

/// `(subject, options) -> validators to run`
pub type ValidatorSchemeFn =
    Arc<dyn Fn(Subject<'_>, &[Value]) -> Result<Vec<Invocation>, RuleFailure> + Send + Sync>;

/// `(value, options) -> new value`
pub type SanitizerFn = Arc<dyn Fn(&Value, &[Value]) -> Result<Value, RuleFailure> + Send + Sync>;

/// `(value, options) -> sanitizers to run`
pub type SanitizerSchemeFn =
    Arc<dyn Fn(&Value, &[Value]) -> Result<Vec<Invocation>, RuleFailure> + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subject_accessors() {
        let value = json!("abc");
        let subject = Subject::Value(&value);
        assert_eq!(subject.as_str(), Some("abc"));
        assert!(subject.as_group().is_none());

        let group = GroupResult::default();
        let subject = Subject::Group(&group);
        assert!(subject.as_value().is_none());
        assert!(subject.as_group().is_some());
    }

    #[test]
    fn test_rules_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<ValidatorFn>();
        assert_send_sync::<ValidatorSchemeFn>();
        assert_send_sync::<SanitizerFn>();
        assert_send_sync::<SanitizerSchemeFn>();
    }
}
