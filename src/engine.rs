//! Validation engine: tree walking, leaf processing and group aggregation

pub mod executor;
mod group;
mod leaf;
mod scheme;

pub use executor::{Engine, EngineOptions};

use crate::rules::RuleRegistry;

/// Per-run state shared by every stage of one walk
#[derive(Clone, Copy)]
pub(crate) struct RunContext<'a> {
    pub registry: &'a RuleRegistry,
    pub parallel: bool,
}
