//! Check command implementation
//!
//! This module implements the `vldtr check` command, which:
//! - Loads configuration from vldtr.toml (if any)
//! - Loads the declaration and the JSON input
//! - Runs the engine
//! - Formats output (human or JSON)
//! - Returns appropriate exit code

use crate::cli::args::OutputFormat;
use crate::cli::common::{EXIT_ERROR, EXIT_INVALID, EXIT_PARSE_ERROR, EXIT_SUCCESS};
use crate::declaration::Group;
use crate::error::{ConfigError, RuleError, VldtrError};
use crate::output::{HumanFormatter, JsonFormatter, Report};
use std::path::Path;

/// Error type specific to check command
#[derive(Debug, thiserror::Error)]
pub(crate) enum CheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("{0}")]
    Engine(#[from] VldtrError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CheckError {
    fn exit_code(&self) -> i32 {
        match self {
            CheckError::Config(ConfigError::Parse(_) | ConfigError::Json(_))
            | CheckError::Engine(VldtrError::Config(ConfigError::Parse(_) | ConfigError::Json(_))) => {
                EXIT_PARSE_ERROR
            }
            _ => EXIT_ERROR,
        }
    }
}

/// Run the check command
///
/// # Arguments
///
/// * `declaration` - Declaration file (.json or .toml)
/// * `input` - JSON input file
/// * `config` - Optional configuration file
/// * `format` - Output format (human or JSON)
/// * `color` - Color choice for human output
///
/// # Returns
///
/// Exit code:
/// - 0: Input is valid
/// - 1: Input failed validation
/// - 2: Error (unknown rule, failing rule, I/O error)
/// - 3: Parse error (invalid TOML or JSON)
pub fn run_check(
    declaration: &Path,
    input: &Path,
    config: Option<&Path>,
    format: OutputFormat,
    color: termcolor::ColorChoice,
) -> i32 {
    match run_check_inner(declaration, input, config, format, color) {
        Ok(true) => EXIT_SUCCESS,
        Ok(false) => EXIT_INVALID,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

/// Internal implementation of check command
fn run_check_inner(
    declaration: &Path,
    input: &Path,
    config: Option<&Path>,
    format: OutputFormat,
    color: termcolor::ColorChoice,
) -> Result<bool, CheckError> {
    let config = super::common::load_config(config)?;
    let engine = config.engine()?;

    let declaration = Group::load(declaration)?;
    let input = super::common::load_input(input)?;

    log::debug!(
        "checking {} declared leaves with {} registered rules",
        declaration.leaf_names().len(),
        engine.registry().len()
    );

    let result = engine.run(&declaration, &input)?;
    let report = Report::from_result(&result);

    match format {
        OutputFormat::Human => HumanFormatter::new(color).write_to_stdout(&report)?,
        OutputFormat::Json => JsonFormatter::new().write_to_stdout(&report)?,
    }

    Ok(report.valid)
}
