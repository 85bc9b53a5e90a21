//! Common helper functions shared across CLI commands
//!
//! This module provides shared functionality for loading configuration and
//! input files.

use crate::cli::args::ColorChoice;
use crate::config::Config;
use crate::error::ConfigError;
use serde_json::Value;
use std::fs;
use std::io::IsTerminal;
use std::path::Path;

/// Process exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_INVALID: i32 = 1;
pub const EXIT_ERROR: i32 = 2;
pub const EXIT_PARSE_ERROR: i32 = 3;

/// Configuration file picked up from the working directory
pub const DEFAULT_CONFIG: &str = "vldtr.toml";

/// Load configuration
///
/// An explicit path must exist. Without one, `./vldtr.toml` is used when
/// present and the defaults otherwise.
///
/// # Errors
///
/// Returns `ConfigError::Io` if the file cannot be read.
/// Returns `ConfigError::Parse` if the file is not valid TOML.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG);
            if default.exists() {
                log::debug!("using {}", DEFAULT_CONFIG);
                Config::load(default)
            } else {
                Ok(Config::default())
            }
        }
    }
}

/// Load a JSON input document
pub(crate) fn load_input(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Resolve the color flag for stdout
impl From<ColorChoice> for termcolor::ColorChoice {
    fn from(choice: ColorChoice) -> Self {
        match choice {
            ColorChoice::Always => termcolor::ColorChoice::Always,
            ColorChoice::Never => termcolor::ColorChoice::Never,
            ColorChoice::Auto if std::io::stdout().is_terminal() => termcolor::ColorChoice::Auto,
            ColorChoice::Auto => termcolor::ColorChoice::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_explicit_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\nparallel = false").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert!(!config.engine.parallel);
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let result = load_config(Some(Path::new("/nonexistent/vldtr.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_input() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"first_name": "Jo"}}"#).unwrap();

        let input = load_input(file.path()).unwrap();
        assert_eq!(input["first_name"], "Jo");
    }

    #[test]
    fn test_load_input_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{ not json").unwrap();

        let result = load_input(file.path());
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(
            termcolor::ColorChoice::from(ColorChoice::Always),
            termcolor::ColorChoice::Always
        );
        assert_eq!(
            termcolor::ColorChoice::from(ColorChoice::Never),
            termcolor::ColorChoice::Never
        );
    }
}
