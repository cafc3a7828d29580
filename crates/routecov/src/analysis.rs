//! Project-level route coverage
//!
//! Ties discovery, the two tree builders and the correlator together: find
//! route files, build their trees, then compare every identified route with
//! the runtime dumps collected for it.

use crate::catalog::StepCatalog;
use crate::coverage::{CoverageCorrelator, RouteCoverageReport};
use crate::discovery::{
    discover_files, DiscoveredFile, FileFilter, ProjectLayout, MARKUP_EXTENSION, SOURCE_EXTENSION,
};
use crate::markup::{parse_markup_routes, relative_file_name};
use crate::node::RouteTree;
use crate::result::{RouteCoverageError, RouteCoverageResult};
use crate::source::{parse_route_builder_trees, RustSourceUnit};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Default runtime dump directory, relative to the base directory
pub const DEFAULT_DUMP_DIR: &str = "target/route-coverage";

/// Indentation used when logging discovered trees
const LOG_INDENT: usize = 4;

/// Settings of one coverage run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageOptions {
    /// Where to look for route declarations
    pub layout: ProjectLayout,
    /// Directory holding runtime dumps
    pub dump_dir: PathBuf,
    /// Comma-separated include patterns
    #[serde(default)]
    pub includes: Option<String>,
    /// Comma-separated exclude patterns
    #[serde(default)]
    pub excludes: Option<String>,
    /// Fail when a route is not fully covered
    #[serde(default)]
    pub fail_on_error: bool,
    /// Also scan test roots
    #[serde(default)]
    pub include_test: bool,
}

impl CoverageOptions {
    /// Conventional layout below `base_dir` and the default dump directory
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            dump_dir: base_dir.join(DEFAULT_DUMP_DIR),
            layout: ProjectLayout::conventional(base_dir),
            includes: None,
            excludes: None,
            fail_on_error: false,
            include_test: false,
        }
    }

    /// Replace the project layout
    #[must_use]
    pub fn with_layout(mut self, layout: ProjectLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the include patterns
    #[must_use]
    pub fn with_includes(mut self, includes: Option<String>) -> Self {
        self.includes = includes;
        self
    }

    /// Set the exclude patterns
    #[must_use]
    pub fn with_excludes(mut self, excludes: Option<String>) -> Self {
        self.excludes = excludes;
        self
    }

    /// Set the dump directory
    #[must_use]
    pub fn with_dump_dir(mut self, dump_dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = dump_dir.into();
        self
    }

    /// Scan test roots too
    #[must_use]
    pub fn with_include_test(mut self, include_test: bool) -> Self {
        self.include_test = include_test;
        self
    }

    /// Fail on incomplete coverage
    #[must_use]
    pub fn with_fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.fail_on_error = fail_on_error;
        self
    }
}

/// A file that could not be turned into route trees
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileWarning {
    /// File path relative to the base directory
    pub file: String,
    /// Why it was skipped
    pub cause: String,
}

/// Routes found in a project
#[derive(Debug, Clone, Default)]
pub struct RouteDiscovery {
    /// Routes carrying an id
    pub routes: Vec<RouteTree>,
    /// Routes without an id, left out of coverage
    pub anonymous: usize,
    /// Files that failed to parse
    pub warnings: Vec<FileWarning>,
}

/// Outcome of a coverage run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectCoverage {
    /// Per-route reports
    pub reports: Vec<RouteCoverageReport>,
    /// Routes without an id
    pub anonymous: usize,
    /// Files that failed to parse
    pub warnings: Vec<FileWarning>,
}

impl ProjectCoverage {
    /// Reports with at least one step that never ran
    pub fn incomplete(&self) -> impl Iterator<Item = &RouteCoverageReport> + '_ {
        self.reports.iter().filter(|r| !r.is_fully_covered())
    }

    /// Whether every route is fully covered
    #[must_use]
    pub fn is_fully_covered(&self) -> bool {
        self.incomplete().next().is_none()
    }

    /// Whether the run should fail under the given setting
    #[must_use]
    pub fn should_fail(&self, fail_on_error: bool) -> bool {
        fail_on_error && !self.is_fully_covered()
    }
}

/// Find and build every route of the project.
///
/// Files that fail to parse become warnings; only an unusable project
/// directory or filter aborts discovery.
pub fn discover_routes(
    options: &CoverageOptions,
    catalog: &dyn StepCatalog,
) -> RouteCoverageResult<RouteDiscovery> {
    let base_dir = &options.layout.base_dir;
    if !base_dir.is_dir() {
        return Err(RouteCoverageError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("base directory {} does not exist", base_dir.display()),
        )));
    }
    let filter = FileFilter::new(options.includes.as_deref(), options.excludes.as_deref())?;

    let mut discovery = RouteDiscovery::default();
    let mut trees = Vec::new();

    for file in accepted(&options.layout, options.include_test, SOURCE_EXTENSION, &filter)? {
        let name = relative_file_name(base_dir, &file.path);
        let built = RustSourceUnit::from_path(&file.path, &name)
            .and_then(|unit| parse_route_builder_trees(&unit, true, catalog));
        match built {
            Ok(found) => trees.extend(found),
            Err(e) => {
                warn!("Error parsing source file {name} due {e}");
                discovery.warnings.push(FileWarning {
                    file: name,
                    cause: e.to_string(),
                });
            }
        }
    }

    for file in accepted(&options.layout, options.include_test, MARKUP_EXTENSION, &filter)? {
        let name = relative_file_name(base_dir, &file.path);
        let built = std::fs::read_to_string(&file.path)
            .map_err(RouteCoverageError::from)
            .and_then(|source| parse_markup_routes(&source, &file.path, base_dir));
        match built {
            Ok(found) => trees.extend(found),
            Err(e) => {
                warn!("Error parsing markup file {name} due {e}");
                discovery.warnings.push(FileWarning {
                    file: name,
                    cause: e.to_string(),
                });
            }
        }
    }

    info!("Discovered {} routes", trees.len());

    let (routes, anonymous): (Vec<_>, Vec<_>) =
        trees.into_iter().partition(|t| t.route_id().is_some());
    discovery.anonymous = anonymous.len();
    if discovery.anonymous > 0 {
        warn!(
            "Discovered {} anonymous routes. Add route ids to these routes for route coverage support",
            discovery.anonymous
        );
    }

    for tree in &routes {
        info!(
            "Route {} discovered in file {}",
            tree.route_id().unwrap_or_default(),
            tree.source_file().unwrap_or_default()
        );
        info!("\n{}\n", tree.dump(LOG_INDENT));
    }
    discovery.routes = routes;
    Ok(discovery)
}

/// Discover routes and compare each with its runtime dumps
pub fn analyze_project(
    options: &CoverageOptions,
    catalog: &dyn StepCatalog,
) -> RouteCoverageResult<ProjectCoverage> {
    let discovery = discover_routes(options, catalog)?;
    let correlator = CoverageCorrelator::new(catalog);

    let mut reports = Vec::with_capacity(discovery.routes.len());
    for tree in &discovery.routes {
        let Some(route_id) = tree.route_id() else {
            continue;
        };
        let data = correlator.correlate_dir(&options.dump_dir, route_id)?;
        let report = RouteCoverageReport::compare(tree, &data, catalog);
        if !report.is_reliable() {
            warn!(route_id, "runtime dumps do not line up with the route structure");
        }
        debug!(
            route_id,
            covered = report.summary().covered_steps,
            total = report.summary().total_steps,
            "route coverage"
        );
        reports.push(report);
    }

    let coverage = ProjectCoverage {
        reports,
        anonymous: discovery.anonymous,
        warnings: discovery.warnings,
    };
    if !coverage.is_fully_covered() {
        info!(
            "{} of {} routes are not fully covered",
            coverage.incomplete().count(),
            coverage.reports.len()
        );
    }
    Ok(coverage)
}

fn accepted(
    layout: &ProjectLayout,
    include_test: bool,
    extension: &str,
    filter: &FileFilter,
) -> RouteCoverageResult<Vec<DiscoveredFile>> {
    Ok(discover_files(layout, include_test, extension)?
        .into_iter()
        .filter(|f| filter.accepts(f))
        .collect())
}
