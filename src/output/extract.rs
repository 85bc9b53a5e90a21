#![forbid(unsafe_code)]

//! Read-only projections over a result tree
//!
//! Both projections flatten nesting: entries are keyed by the bare leaf or
//! group name, mirroring how leaves look up their input values.

use crate::result::{ErrorMap, GroupResult, ResultNode};
use indexmap::IndexMap;
use serde_json::Value;

/// Key under which the root group's own errors are reported
pub const ROOT_KEY: &str = "*";

/// Errors of every failing node, keyed by name
pub type ErrorReport = IndexMap<String, ErrorMap>;

/// Sanitized value of every leaf, keyed by name
pub type ValueReport = IndexMap<String, Option<Value>>;

/// Collect the errors of failing nodes only
///
/// Valid subtrees are pruned entirely. A failing group contributes its own
/// errors under `key` (when it has any) and then its failing children; nested
/// groups report under their own name.
pub fn collect_errors(tree: &GroupResult, key: &str) -> ErrorReport {
    let mut report = ErrorReport::new();
    collect_group_errors(tree, key, &mut report);
    report
}

fn collect_group_errors(group: &GroupResult, key: &str, report: &mut ErrorReport) {
    if group.valid {
        return;
    }
    if !group.errors.is_empty() {
        report.insert(key.to_string(), group.errors.clone());
    }
    for (name, node) in &group.keys {
        match node {
            ResultNode::Group(child) => collect_group_errors(child, name, report),
            ResultNode::Leaf(leaf) if !leaf.valid => {
                report.insert(name.clone(), leaf.errors.clone());
            }
            ResultNode::Leaf(_) => {}
        }
    }
}

/// Collect every leaf's sanitized value, valid or not
///
/// Absent optional leaves map to `None`.
pub fn collect_values(tree: &GroupResult) -> ValueReport {
    let mut report = ValueReport::new();
    collect_group_values(tree, &mut report);
    report
}

fn collect_group_values(group: &GroupResult, report: &mut ValueReport) {
    for (name, node) in &group.keys {
        match node {
            ResultNode::Group(child) => collect_group_values(child, report),
            ResultNode::Leaf(leaf) => {
                report.insert(name.clone(), leaf.value_sanitized.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::LeafResult;
    use serde_json::json;

    fn leaf(valid: bool, errors: &[(&str, Vec<Value>)], sanitized: Option<Value>) -> ResultNode {
        ResultNode::Leaf(LeafResult {
            valid,
            errors: errors
                .iter()
                .map(|(name, options)| (name.to_string(), options.clone()))
                .collect(),
            value: sanitized.clone(),
            value_sanitized: sanitized,
        })
    }

    fn group(valid: bool, errors: ErrorMap, keys: Vec<(&str, ResultNode)>) -> GroupResult {
        GroupResult {
            valid,
            errors,
            keys: keys
                .into_iter()
                .map(|(name, node)| (name.to_string(), node))
                .collect(),
        }
    }

    #[test]
    fn test_all_valid_tree_has_no_errors() {
        let tree = group(
            true,
            ErrorMap::new(),
            vec![("a", leaf(true, &[], Some(json!("x"))))],
        );
        assert!(collect_errors(&tree, ROOT_KEY).is_empty());
    }

    #[test]
    fn test_nested_failing_leaf_is_flattened() {
        let inner = group(
            false,
            ErrorMap::new(),
            vec![("b", leaf(false, &[("range", vec![json!(2), json!(35)])], None))],
        );
        let tree = group(false, ErrorMap::new(), vec![("a", ResultNode::Group(inner))]);

        let errors = collect_errors(&tree, ROOT_KEY);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["b"]["range"], vec![json!(2), json!(35)]);
    }

    #[test]
    fn test_valid_group_prunes_invalid_children() {
        let mut group_errors = ErrorMap::new();
        group_errors.insert("validMin".to_string(), vec![json!(1)]);
        let passing = group(
            true,
            ErrorMap::new(),
            vec![
                ("online", leaf(true, &[], Some(json!("1")))),
                ("offline", leaf(false, &[("optional", vec![])], None)),
            ],
        );
        let failing = group(
            false,
            group_errors,
            vec![("phone", leaf(false, &[("optional", vec![])], None))],
        );
        let tree = group(
            false,
            ErrorMap::new(),
            vec![
                ("online_offline", ResultNode::Group(passing)),
                ("contact", ResultNode::Group(failing)),
            ],
        );

        let errors = collect_errors(&tree, ROOT_KEY);
        let keys: Vec<&str> = errors.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["contact", "phone"]);
        assert_eq!(errors["contact"]["validMin"], vec![json!(1)]);
    }

    #[test]
    fn test_root_errors_use_given_key() {
        let mut root_errors = ErrorMap::new();
        root_errors.insert("invalidMax".to_string(), vec![json!(0)]);
        let tree = group(false, root_errors, vec![]);

        assert!(collect_errors(&tree, ROOT_KEY).contains_key("*"));
        assert!(collect_errors(&tree, "form").contains_key("form"));
    }

    #[test]
    fn test_values_include_invalid_and_nested_leaves() {
        let inner = group(
            false,
            ErrorMap::new(),
            vec![("b", leaf(false, &[("isNumber", vec![])], Some(json!("x."))))],
        );
        let tree = group(
            false,
            ErrorMap::new(),
            vec![
                ("a", leaf(true, &[], Some(json!("+a.")))),
                ("inner", ResultNode::Group(inner)),
                ("c", leaf(true, &[], None)),
            ],
        );

        let values = collect_values(&tree);
        let keys: Vec<&str> = values.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(values["b"], Some(json!("x.")));
        assert_eq!(values["c"], None);
    }
}
