//! Routecov CLI: route coverage from the command line
//!
//! ## Usage
//!
//! ```bash
//! routecov routes                            # List discovered routes
//! routecov coverage                          # Report coverage from target/route-coverage
//! routecov coverage --fail-on-error          # Fail when a step never ran
//! routecov coverage --excludes "legacy/*"    # Skip matching files
//! ```

use clap::Parser;
use routecov_cli::{
    handlers::{execute_coverage, execute_routes},
    Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity,
};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Build configuration from CLI args
    let config = build_config(&cli);
    init_tracing(&config);

    match cli.command {
        Commands::Coverage(args) => execute_coverage(&config, &args),
        Commands::Routes(args) => execute_routes(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let color: ColorChoice = cli.color.clone().into();

    CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(color)
        .with_indent_unit(cli.indent)
}

/// Log to stderr; `RUST_LOG` overrides the level picked from `-v`/`-q`
fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_directive()));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(config.color.should_color()),
        )
        .try_init();
}
