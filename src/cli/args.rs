//! CLI argument parsing using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for `vldtr check`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// A single JSON object with `valid`, `errors` and `values`
    Json,
}

/// Output format for `vldtr list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable output
    Human,
    /// JSON Lines format (one JSON object per line)
    Jsonl,
}

/// When to color human output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stdout is a terminal
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

/// vldtr CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "vldtr")]
#[command(about = "Declarative field validation and sanitization")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Output coloring
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available vldtr subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate and sanitize a JSON input against a declaration
    Check {
        /// Declaration file (.json or .toml)
        declaration: PathBuf,

        /// JSON input file
        input: PathBuf,

        /// Configuration file (defaults to ./vldtr.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,
    },

    /// List every registered rule
    List {
        /// Configuration file (defaults to ./vldtr.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: ListFormat,
    },
}
