//! Coverage command handler

use super::{coverage_options, load_catalog};
use crate::commands::CoverageArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{
    render_coverage_json, render_coverage_text, render_dump_details, OutputFormat, StatusReporter,
};
use routecov::{analyze_project, ProjectCoverage};
use tracing::debug;

/// Message reported when `--fail-on-error` finds uncovered steps
pub const INCOMPLETE_COVERAGE_MESSAGE: &str = "Some routes are not fully covered";

/// Execute the coverage command
pub fn execute_coverage(config: &CliConfig, args: &CoverageArgs) -> CliResult<()> {
    let catalog = load_catalog(args.discovery.catalog.as_deref())?;
    let options = coverage_options(&args.discovery, &args.dump_dir)?
        .with_fail_on_error(args.fail_on_error);
    debug!(?options, catalog = %catalog.version, "starting coverage run");

    let coverage = analyze_project(&options, &catalog)?;
    let use_color = config.color.should_color();
    let reporter = StatusReporter::new(use_color, config.verbosity.is_quiet());
    report_problems(&coverage, &reporter);

    match OutputFormat::from(args.format) {
        OutputFormat::Json => {
            let json = render_coverage_json(&coverage)
                .map_err(|e| CliError::config(format!("cannot serialize report: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Text => {
            if !config.verbosity.is_quiet() {
                print!("{}", render_coverage_text(&coverage, config.indent_unit, use_color));
                if config.verbosity.is_verbose() {
                    print!("{}", render_dump_details(&coverage));
                }
            }
        }
    }

    check_coverage(&coverage, options.fail_on_error, &reporter)
}

/// Warn about skipped files and dumps that could not be trusted
pub fn report_problems(coverage: &ProjectCoverage, reporter: &StatusReporter) {
    for warning in &coverage.warnings {
        reporter.warning(&format!("Skipped {}: {}", warning.file, warning.cause));
    }
    for report in coverage.reports.iter().filter(|r| !r.is_reliable()) {
        reporter.warning(&format!(
            "Route {}: runtime dumps do not match the route structure, counts may be misattributed",
            report.route_id
        ));
        for mismatch in &report.mismatches {
            reporter.warning(&format!("  {mismatch}"));
        }
    }
}

/// Fail the run when required coverage is missing
pub fn check_coverage(
    coverage: &ProjectCoverage,
    fail_on_error: bool,
    reporter: &StatusReporter,
) -> CliResult<()> {
    if coverage.should_fail(fail_on_error) {
        for report in coverage.incomplete() {
            reporter.failure(&format!("Route {} is not fully covered", report.route_id));
        }
        return Err(CliError::incomplete_coverage(INCOMPLETE_COVERAGE_MESSAGE));
    }
    if coverage.is_fully_covered() {
        reporter.success("All routes are fully covered");
    }
    Ok(())
}
