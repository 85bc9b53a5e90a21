#![forbid(unsafe_code)]

//! Request-pipeline adapter
//!
//! A `ValidationGate` binds an engine, a declaration and an input location.
//! Handling a request runs the engine over the selected input, attaches the
//! annotated result and both projections to the request, and optionally
//! rejects the request when anything failed.

use crate::declaration::Group;
use crate::engine::Engine;
use crate::error::VldtrError;
use crate::output::extract::{ErrorReport, ROOT_KEY, ValueReport, collect_errors, collect_values};
use crate::result::GroupResult;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// HTTP status used when a gate rejects a request
pub const REJECTION_STATUS: u16 = 400;

/// Error key reported with a rejection
pub const REJECTION_KEY: &str = "validation";

/// Where in the request the raw input lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLocation {
    Body,
    Query,
    Params,
    Headers,
}

/// Engine output attached to a handled request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validated {
    pub result: GroupResult,
    pub errors: ErrorReport,
    pub values: ValueReport,
}

/// Minimal request model the gate reads from and writes to
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Request {
    pub body: Value,
    pub query: Value,
    pub params: Value,
    pub headers: Value,
    pub validated: Option<Validated>,
}

impl Request {
    pub fn with_body(body: Value) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    pub fn input(&self, location: InputLocation) -> &Value {
        match location {
            InputLocation::Body => &self.body,
            InputLocation::Query => &self.query,
            InputLocation::Params => &self.params,
            InputLocation::Headers => &self.headers,
        }
    }
}

/// Structured rejection raised when validation fails
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("request failed validation ({} failing entries)", .errors.len())]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    pub status_code: u16,
    pub key: String,
    pub errors: ErrorReport,
    pub values: ValueReport,
}

/// Gate outcome when the request does not pass through
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The engine itself failed (unknown rule, failing rule implementation)
    #[error(transparent)]
    Engine(#[from] VldtrError),

    /// The input failed validation and the gate rejects on error
    #[error(transparent)]
    Rejected(ValidationFailure),
}

/// Validation step for a request pipeline
#[derive(Debug, Clone)]
pub struct ValidationGate {
    engine: Arc<Engine>,
    declaration: Arc<Group>,
    location: InputLocation,
    throw_on_error: bool,
}

impl ValidationGate {
    /// Creates a gate
    ///
    /// # Arguments
    ///
    /// * `engine` - Engine used for every request
    /// * `declaration` - Declaration applied to every request; shared, never mutated
    /// * `location` - Part of the request holding the raw input
    /// * `throw_on_error` - Reject requests whose input fails validation
    pub fn new(
        engine: Arc<Engine>,
        declaration: Arc<Group>,
        location: InputLocation,
        throw_on_error: bool,
    ) -> Self {
        Self {
            engine,
            declaration,
            location,
            throw_on_error,
        }
    }

    /// Validate the request's input and attach the outcome
    ///
    /// # Errors
    ///
    /// Returns `GateError::Rejected` when `throw_on_error` is set and any
    /// errors were collected; nothing is attached in that case. Returns
    /// `GateError::Engine` when the engine aborts.
    pub fn handle(&self, request: &mut Request) -> Result<(), GateError> {
        let result = self
            .engine
            .run(&self.declaration, request.input(self.location))?;
        let errors = collect_errors(&result, ROOT_KEY);
        let values = collect_values(&result);

        if self.throw_on_error && !errors.is_empty() {
            log::debug!("rejecting request with {} failing entries", errors.len());
            return Err(GateError::Rejected(ValidationFailure {
                status_code: REJECTION_STATUS,
                key: REJECTION_KEY.to_string(),
                errors,
                values,
            }));
        }

        request.validated = Some(Validated {
            result,
            errors,
            values,
        });
        Ok(())
    }
}
