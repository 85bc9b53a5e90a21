#![forbid(unsafe_code)]

//! Tree walker that drives leaf and group evaluation
//!
//! This module provides the Engine, which resolves a declaration tree against
//! a raw input tree. Each tier (one group's direct children) fans out with
//! rayon and joins before the group itself is aggregated.

use crate::declaration::{Group, Leaf, Node};
use crate::engine::RunContext;
use crate::engine::group::process_group;
use crate::engine::leaf::process_leaf;
use crate::engine::scheme;
use crate::error::{RuleError, VldtrError};
use crate::result::{GroupResult, LeafResult, ResultNode};
use crate::rules::{RuleRegistry, Subject};
use crate::types::{Invocation, RuleClass};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde_json::Value;
use std::sync::Arc;

/// Engine tuning knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Evaluate siblings and validator lists concurrently
    pub parallel: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Validation engine bound to one immutable rule registry
///
/// The engine holds no per-run state, so a single instance (and a single
/// declaration) can serve any number of concurrent `run` calls.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<RuleRegistry>,
    options: EngineOptions,
}

impl Engine {
    /// Creates an engine with the built-in rules plus `overrides`
    ///
    /// # Arguments
    ///
    /// * `overrides` - Rules merged over the defaults, class by class; a
    ///   same-named override replaces the built-in
    pub fn new(overrides: RuleRegistry) -> Self {
        Self::with_registry(RuleRegistry::with_builtins().merge(overrides))
    }

    /// Creates an engine with only the built-in rules
    pub fn with_builtins() -> Self {
        Self::with_registry(RuleRegistry::with_builtins())
    }

    /// Creates an engine around a fully assembled registry
    pub fn with_registry(registry: RuleRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            options: EngineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Validate and sanitize `input` against `declaration`
    ///
    /// Leaves read their value from `input` by bare name, however deeply the
    /// leaf is nested in the declaration.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::UnknownRule` if the declaration (or a scheme
    /// expansion) names an unregistered rule, and `RuleError::Failed` if a rule
    /// implementation fails. Either aborts the whole run.
    pub fn run(&self, declaration: &Group, input: &Value) -> Result<GroupResult, VldtrError> {
        self.check_declaration(declaration)?;
        log::debug!(
            "running declaration with {} top-level key(s), parallel={}",
            declaration.keys.len(),
            self.options.parallel
        );

        let result = walk_group(self.context(), declaration, input)?;
        log::debug!("run finished, valid={}", result.valid);
        Ok(result)
    }

    /// Evaluate a single leaf against a raw value
    ///
    /// `raw` is `None` for an absent field.
    pub fn process_leaf(&self, leaf: &Leaf, raw: Option<&Value>) -> Result<LeafResult, VldtrError> {
        Ok(process_leaf(self.context(), leaf, raw)?)
    }

    /// Expand a validator scheme into the validators it stands for
    pub fn expand_validator_scheme(
        &self,
        invocation: &Invocation,
        subject: Subject<'_>,
    ) -> Result<Vec<Invocation>, VldtrError> {
        Ok(scheme::expand_validator_scheme(
            self.context(),
            invocation,
            subject,
        )?)
    }

    /// Expand a sanitizer scheme into the sanitizers it stands for
    pub fn expand_sanitizer_scheme(
        &self,
        invocation: &Invocation,
        value: &Value,
    ) -> Result<Vec<Invocation>, VldtrError> {
        Ok(scheme::expand_sanitizer_scheme(
            self.context(),
            invocation,
            value,
        )?)
    }

    /// Check that every rule named directly in `declaration` is registered
    ///
    /// Names that only appear in a scheme's expansion are checked when the
    /// scheme is evaluated.
    pub fn check_declaration(&self, declaration: &Group) -> Result<(), RuleError> {
        self.check_invocations(RuleClass::Validator, &declaration.validators)?;
        self.check_invocations(RuleClass::ValidatorScheme, &declaration.validator_schemes)?;

        for node in declaration.keys.values() {
            match node {
                Node::Group(group) => self.check_declaration(group)?,
                Node::Leaf(leaf) => {
                    self.check_invocations(RuleClass::Validator, &leaf.validators)?;
                    self.check_invocations(RuleClass::ValidatorScheme, &leaf.validator_schemes)?;
                    self.check_invocations(RuleClass::Sanitizer, &leaf.sanitizations)?;
                    self.check_invocations(
                        RuleClass::SanitizerScheme,
                        &leaf.sanitization_schemes,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn check_invocations(
        &self,
        class: RuleClass,
        invocations: &[Invocation],
    ) -> Result<(), RuleError> {
        match invocations
            .iter()
            .find(|invocation| !self.registry.contains(class, invocation.name.as_str()))
        {
            Some(invocation) => Err(RuleError::UnknownRule {
                class,
                name: invocation.name.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn context(&self) -> RunContext<'_> {
        RunContext {
            registry: &self.registry,
            parallel: self.options.parallel,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Resolve every child of `group`, then aggregate the group itself
fn walk_group(ctx: RunContext<'_>, group: &Group, input: &Value) -> Result<GroupResult, RuleError> {
    let resolve = |(name, node): (&String, &Node)| -> Result<(String, ResultNode), RuleError> {
        let result = match node {
            Node::Group(child) => ResultNode::Group(walk_group(ctx, child, input)?),
            Node::Leaf(leaf) => {
                log::trace!("processing leaf '{}'", name);
                ResultNode::Leaf(process_leaf(ctx, leaf, input.get(name))?)
            }
        };
        Ok((name.clone(), result))
    };

    let children: Vec<(String, ResultNode)> = if ctx.parallel {
        group.keys.par_iter().map(resolve).collect::<Result<_, _>>()?
    } else {
        group.keys.iter().map(resolve).collect::<Result<_, _>>()?
    };

    let keys: IndexMap<String, ResultNode> = children.into_iter().collect();
    process_group(ctx, group, keys, input)
}
