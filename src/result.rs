#![forbid(unsafe_code)]

//! Result trees, isomorphic to the declaration they were produced from

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Failed rules, keyed by rule name, in evaluation order
///
/// The value is the option list the rule was called with. Re-inserting a name
/// keeps its original position and replaces the options, so the last failing
/// invocation of a name wins.
pub type ErrorMap = IndexMap<String, Vec<Value>>;

/// Outcome for one leaf
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafResult {
    pub valid: bool,
    pub errors: ErrorMap,

    /// Raw input, unchanged; `None` when the key was absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_sanitized: Option<Value>,
}

/// Outcome for one group, with a result for each declared child
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GroupResult {
    pub valid: bool,
    pub errors: ErrorMap,
    pub keys: IndexMap<String, ResultNode>,
}

impl GroupResult {
    /// Whether every direct child is valid
    pub fn children_valid(&self) -> bool {
        self.keys.values().all(ResultNode::valid)
    }

    /// Count of direct children that are valid
    pub fn valid_children(&self) -> usize {
        self.keys.values().filter(|node| node.valid()).count()
    }

    /// Look up a leaf anywhere below this group by its bare name
    pub fn find_leaf(&self, name: &str) -> Option<&LeafResult> {
        for (key, node) in &self.keys {
            match node {
                ResultNode::Leaf(leaf) if key == name => return Some(leaf),
                ResultNode::Leaf(_) => {}
                ResultNode::Group(group) => {
                    if let Some(leaf) = group.find_leaf(name) {
                        return Some(leaf);
                    }
                }
            }
        }
        None
    }
}

/// Either a leaf or a group result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultNode {
    Leaf(LeafResult),
    Group(GroupResult),
}

impl ResultNode {
    pub fn valid(&self) -> bool {
        match self {
            ResultNode::Leaf(leaf) => leaf.valid,
            ResultNode::Group(group) => group.valid,
        }
    }

    pub fn errors(&self) -> &ErrorMap {
        match self {
            ResultNode::Leaf(leaf) => &leaf.errors,
            ResultNode::Group(group) => &group.errors,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafResult> {
        match self {
            ResultNode::Leaf(leaf) => Some(leaf),
            ResultNode::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupResult> {
        match self {
            ResultNode::Group(group) => Some(group),
            ResultNode::Leaf(_) => None,
        }
    }
}
