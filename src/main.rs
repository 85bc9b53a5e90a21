//! vldtr CLI entry point

use clap::Parser;
use std::process;
use vldtr::cli::{Command, args::Cli};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let exit_code = match cli.command {
        Command::Check {
            declaration,
            input,
            config,
            format,
        } => vldtr::cli::check::run_check(
            &declaration,
            &input,
            config.as_deref(),
            format,
            cli.color.into(),
        ),
        Command::List { config, format } => vldtr::cli::list::run_list(config.as_deref(), format),
    };

    process::exit(exit_code);
}
