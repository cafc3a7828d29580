//! Command handlers - extracted from main.rs for testability
//!
//! Each handler module contains:
//! - The execution logic for a CLI command
//! - Pure helper functions
//! - Tests

pub mod coverage;
pub mod routes;

pub use coverage::execute_coverage;
pub use routes::execute_routes;

use crate::commands::DiscoveryArgs;
use crate::error::{CliError, CliResult};
use routecov::{CoverageOptions, EipCatalog, ProjectLayout};
use std::path::Path;

/// Load the step catalog, falling back to the built-in one
pub fn load_catalog(path: Option<&Path>) -> CliResult<EipCatalog> {
    match path {
        Some(path) => EipCatalog::load(path).map_err(|e| {
            CliError::config(format!("cannot load step catalog {}: {e}", path.display()))
        }),
        None => Ok(EipCatalog::builtin()),
    }
}

/// Turn discovery arguments into library options
pub fn coverage_options(args: &DiscoveryArgs, dump_dir: &Path) -> CliResult<CoverageOptions> {
    if !args.base_dir.is_dir() {
        return Err(CliError::invalid_argument(format!(
            "base directory {} does not exist",
            args.base_dir.display()
        )));
    }
    let layout = ProjectLayout::conventional(&args.base_dir)
        .with_source_roots(&args.source_roots)
        .with_resource_dirs(&args.resource_dirs);
    Ok(CoverageOptions::new(&args.base_dir)
        .with_dump_dir(args.base_dir.join(dump_dir))
        .with_includes(args.includes.clone())
        .with_excludes(args.excludes.clone())
        .with_include_test(args.include_test)
        .with_layout(layout))
}
