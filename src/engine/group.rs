#![forbid(unsafe_code)]

//! Aggregation of settled child results into a group result

use crate::declaration::Group;
use crate::engine::RunContext;
use crate::engine::scheme::{run_validator_schemes, run_validators};
use crate::error::RuleError;
use crate::result::{ErrorMap, GroupResult, ResultNode};
use crate::rules::Subject;
use indexmap::IndexMap;
use serde_json::Value;

/// Compute a group's own validity from its children
///
/// Every child in `keys` must already be settled. A false `if` condition makes
/// the group valid outright. Otherwise the group is valid when all children
/// are, unless group-level validators are declared, in which case their error
/// set alone decides.
pub(crate) fn process_group(
    ctx: RunContext<'_>,
    group: &Group,
    keys: IndexMap<String, ResultNode>,
    input: &Value,
) -> Result<GroupResult, RuleError> {
    let mut result = GroupResult {
        valid: false,
        errors: ErrorMap::new(),
        keys,
    };

    if let Some(condition) = &group.condition
        && !condition.evaluate(input)
    {
        log::trace!("group condition is false; skipping validity check");
        result.valid = true;
        return Ok(result);
    }

    result.valid = result.children_valid();

    if group.has_group_validators() {
        let mut errors = ErrorMap::new();
        let subject = Subject::Group(&result);
        run_validators(ctx, &group.validators, subject, &mut errors)?;
        run_validator_schemes(ctx, &group.validator_schemes, subject, &mut errors)?;
        result.valid = errors.is_empty();
        result.errors = errors;
    }

    Ok(result)
}
