#![forbid(unsafe_code)]

//! vldtr: declarative, recursive field validation and sanitization
//!
//! A declaration describes named fields (leaves) and nested groups together
//! with the rules that apply to them. The [`Engine`] resolves a declaration
//! against a raw input document and produces a result tree of the same shape,
//! carrying per-node validity, failed rules and sanitized values.
//!
//! ```no_run
//! use serde_json::json;
//! use vldtr::{Engine, Group, collect_errors, collect_values};
//!
//! let declaration = Group::from_value(json!({
//!     "keys": {
//!         "first_name": { "validatorSchemes": [["name"]], "sanitizationSchemes": [["dotPlus"]] }
//!     }
//! }))?;
//! let result = Engine::with_builtins().run(&declaration, &json!({ "first_name": "Jo" }))?;
//! assert!(collect_errors(&result, "*").is_empty());
//! assert_eq!(collect_values(&result)["first_name"], Some(json!("+Jo.")));
//! # Ok::<(), vldtr::VldtrError>(())
//! ```

pub mod cli;
pub mod config;
pub mod declaration;
pub mod engine;
pub mod error;
pub mod gate;
pub mod output;
pub mod result;
pub mod rules;
pub mod types;

// Re-export error types for convenient access
pub use error::{ConfigError, RuleError, RuleFailure, VldtrError};

// Re-export core domain types for convenient access
pub use declaration::{Condition, Group, Leaf, Node};
pub use engine::{Engine, EngineOptions};
pub use output::{collect_errors, collect_values};
pub use result::{ErrorMap, GroupResult, LeafResult, ResultNode};
pub use rules::{RuleRegistry, Subject};
pub use types::{Invocation, RuleClass, RuleName};
