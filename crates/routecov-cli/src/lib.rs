//! Routecov CLI Library
//!
//! Command-line interface for Routecov route coverage reports.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)] // String building is clear and correct
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{Cli, ColorArg, Commands, CoverageArgs, DiscoveryArgs, FormatArg, RoutesArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{
    render_coverage_json, render_coverage_text, render_dump_details, render_route_report,
    render_routes_json, render_routes_text, OutputFormat, StatusReporter,
};
