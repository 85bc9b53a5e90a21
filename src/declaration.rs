#![forbid(unsafe_code)]

//! Declaration trees: the caller-authored description of fields and groups
//!
//! A declaration is plain, immutable data. It can be written in JSON or TOML
//! and is shared freely across concurrent runs; results live in a separate
//! tree (see [`crate::result`]).

use crate::error::ConfigError;
use crate::types::Invocation;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A terminal field and the rules applied to it
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaf {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Invocation>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validator_schemes: Vec<Invocation>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sanitizations: Vec<Invocation>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sanitization_schemes: Vec<Invocation>,

    /// An absent value is valid instead of failing with `optional`
    #[serde(skip_serializing_if = "is_false")]
    pub optional: bool,

    /// An empty string short-circuits to valid, unsanitized
    #[serde(skip_serializing_if = "is_false")]
    pub allow_empty: bool,
}

impl Leaf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(mut self, invocation: Invocation) -> Self {
        self.validators.push(invocation);
        self
    }

    pub fn with_validator_scheme(mut self, invocation: Invocation) -> Self {
        self.validator_schemes.push(invocation);
        self
    }

    pub fn with_sanitization(mut self, invocation: Invocation) -> Self {
        self.sanitizations.push(invocation);
        self
    }

    pub fn with_sanitization_scheme(mut self, invocation: Invocation) -> Self {
        self.sanitization_schemes.push(invocation);
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }
}

/// A named tree node containing leaves and nested groups
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub keys: IndexMap<String, Node>,

    /// Cross-field validators, run against the group result
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Invocation>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validator_schemes: Vec<Invocation>,

    /// Gate for this group's own validity check; `None` means always
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, name: impl Into<String>, node: impl Into<Node>) -> Self {
        self.keys.insert(name.into(), node.into());
        self
    }

    pub fn with_validator(mut self, invocation: Invocation) -> Self {
        self.validators.push(invocation);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Whether cross-field validators replace the plain "all children valid" rule
    pub fn has_group_validators(&self) -> bool {
        !self.validators.is_empty() || !self.validator_schemes.is_empty()
    }

    /// Load a declaration from a file
    ///
    /// Files ending in `.toml` are parsed as TOML, everything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            Self::parse_toml(&content)
        } else {
            Self::parse_json(&content)
        }
    }

    pub fn parse_json(s: &str) -> Result<Self, ConfigError> {
        let group: Group = serde_json::from_str(s)?;
        group.validate();
        Ok(group)
    }

    pub fn parse_toml(s: &str) -> Result<Self, ConfigError> {
        let group: Group = toml::from_str(s)?;
        group.validate();
        Ok(group)
    }

    /// Build a declaration from an in-memory JSON value
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let group: Group = serde_json::from_value(value)?;
        group.validate();
        Ok(group)
    }

    /// Every leaf name in the tree, depth-first in declaration order
    pub fn leaf_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_leaf_names(&mut names);
        names
    }

    fn collect_leaf_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        for (name, node) in &self.keys {
            match node {
                Node::Leaf(_) => names.push(name.as_str()),
                Node::Group(group) => group.collect_leaf_names(names),
            }
        }
    }

    /// Warn about declarations that parse but are probably mistakes
    fn validate(&self) {
        if self.keys.is_empty() {
            log::warn!("declaration group has no keys");
        }

        // Leaves read the input by bare name, so two leaves with the same name
        // see the same value and collide in the extracted values.
        let mut seen = HashSet::new();
        for name in self.leaf_names() {
            if !seen.insert(name) {
                log::warn!(
                    "leaf '{}' is declared more than once; both read the same input value",
                    name
                );
            }
        }
    }
}

impl<'de> Deserialize<'de> for Group {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Node::deserialize(deserializer)? {
            Node::Group(group) => Ok(group),
            Node::Leaf(_) => Err(serde::de::Error::custom(
                "the root of a declaration must be a group with `keys`",
            )),
        }
    }
}

/// Either a leaf or a nested group
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Leaf(Leaf),
    Group(Group),
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawNode::deserialize(deserializer)?;
        Node::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// Wire shape shared by leaves and groups; `keys` decides which one it is
#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RawNode {
    #[serde(default)]
    keys: Option<IndexMap<String, Node>>,
    #[serde(default)]
    validators: Vec<Invocation>,
    #[serde(default, alias = "validator_schemes")]
    validator_schemes: Vec<Invocation>,
    #[serde(default)]
    sanitizations: Vec<Invocation>,
    #[serde(default, alias = "sanitization_schemes")]
    sanitization_schemes: Vec<Invocation>,
    #[serde(default)]
    optional: Option<bool>,
    #[serde(default, alias = "allow_empty")]
    allow_empty: Option<bool>,
    #[serde(default, rename = "if")]
    condition: Option<Condition>,
}

impl TryFrom<RawNode> for Node {
    type Error = String;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        match raw.keys {
            Some(keys) => {
                let mut leaf_only = Vec::new();
                if !raw.sanitizations.is_empty() {
                    leaf_only.push("sanitizations");
                }
                if !raw.sanitization_schemes.is_empty() {
                    leaf_only.push("sanitizationSchemes");
                }
                if raw.optional.is_some() {
                    leaf_only.push("optional");
                }
                if raw.allow_empty.is_some() {
                    leaf_only.push("allowEmpty");
                }
                if !leaf_only.is_empty() {
                    return Err(format!(
                        "group declares leaf-only field(s): {}",
                        leaf_only.join(", ")
                    ));
                }

                Ok(Node::Group(Group {
                    keys,
                    validators: raw.validators,
                    validator_schemes: raw.validator_schemes,
                    condition: raw.condition,
                }))
            }
            None => {
                if raw.condition.is_some() {
                    return Err("`if` is only allowed on groups".to_string());
                }

                Ok(Node::Leaf(Leaf {
                    validators: raw.validators,
                    validator_schemes: raw.validator_schemes,
                    sanitizations: raw.sanitizations,
                    sanitization_schemes: raw.sanitization_schemes,
                    optional: raw.optional.unwrap_or(false),
                    allow_empty: raw.allow_empty.unwrap_or(false),
                }))
            }
        }
    }
}

/// Condition gating a group's own validity check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// Literal on/off
    Literal(bool),
    /// True when the input carries the named field
    Present { present: String },
    /// True when the input's field equals the given value
    Equals { key: String, equals: Value },
}

impl Condition {
    /// Evaluate against the raw input tree
    pub fn evaluate(&self, input: &Value) -> bool {
        match self {
            Condition::Literal(value) => *value,
            Condition::Present { present } => input.get(present).is_some(),
            Condition::Equals { key, equals } => input.get(key) == Some(equals),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
