//! Routes command handler

use super::{coverage_options, load_catalog};
use crate::commands::RoutesArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{render_routes_json, render_routes_text, OutputFormat, StatusReporter};
use routecov::{discover_routes, DEFAULT_DUMP_DIR};
use std::path::Path;

/// Execute the routes command
pub fn execute_routes(config: &CliConfig, args: &RoutesArgs) -> CliResult<()> {
    let catalog = load_catalog(args.discovery.catalog.as_deref())?;
    let options = coverage_options(&args.discovery, Path::new(DEFAULT_DUMP_DIR))?;
    let discovery = discover_routes(&options, &catalog)?;

    let reporter = StatusReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    for warning in &discovery.warnings {
        reporter.warning(&format!("Skipped {}: {}", warning.file, warning.cause));
    }

    match OutputFormat::from(args.format) {
        OutputFormat::Json => {
            let json = render_routes_json(&discovery)
                .map_err(|e| CliError::config(format!("cannot serialize routes: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{}", render_routes_text(&discovery, config.indent_unit)),
    }
    Ok(())
}
