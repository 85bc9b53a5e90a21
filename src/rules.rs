#![forbid(unsafe_code)]

//! Rule definitions and registry

mod builtin;
pub mod coerce;
mod registry;
mod rule;

// Re-export core types
pub use registry::{RuleRegistry, RuleSet};
pub use rule::{SanitizerFn, SanitizerSchemeFn, Subject, ValidatorFn, ValidatorSchemeFn};
