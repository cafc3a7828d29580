//! Output formatting and status reporting

use console::{style, Style, Term};
use routecov::{ProjectCoverage, RouteCoverageReport, RouteDiscovery, RouteTree};
use serde::{Deserialize, Serialize};

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Status lines written to stderr next to the report on stdout
#[derive(Debug)]
pub struct StatusReporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl StatusReporter {
    /// Create a new status reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            use_color,
            quiet,
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }
}

/// Render one route's coverage as text: a heading, then one line per step
#[must_use]
pub fn render_route_report(report: &RouteCoverageReport, indent_unit: usize, use_color: bool) -> String {
    let summary = report.summary();
    let heading = format!(
        "Route {} ({}): {}/{} steps covered ({:.1}%)",
        report.route_id,
        report.source_file.as_deref().unwrap_or("<unknown>"),
        summary.covered_steps,
        summary.total_steps,
        summary.coverage_percent
    );

    let mut out = if use_color {
        Style::new().bold().apply_to(heading).to_string()
    } else {
        heading
    };
    out.push('\n');

    let missing = Style::new().red();
    for node in &report.nodes {
        let line = format!(
            "{}\t{}\t{}{}",
            node.order,
            node.count,
            " ".repeat(node.level * indent_unit),
            node.name
        );
        if use_color && !node.is_covered() {
            out.push_str(&missing.apply_to(line).to_string());
        } else {
            out.push_str(&line);
        }
        out.push('\n');
    }
    out
}

/// Render a whole coverage run as text
#[must_use]
pub fn render_coverage_text(coverage: &ProjectCoverage, indent_unit: usize, use_color: bool) -> String {
    let mut out = String::new();
    for report in &coverage.reports {
        out.push_str(&render_route_report(report, indent_unit, use_color));
        out.push('\n');
    }
    let incomplete = coverage.incomplete().count();
    out.push_str(&format!(
        "{} routes, {} fully covered, {} not fully covered",
        coverage.reports.len(),
        coverage.reports.len() - incomplete,
        incomplete
    ));
    if coverage.anonymous > 0 {
        out.push_str(&format!(", {} anonymous skipped", coverage.anonymous));
    }
    out.push('\n');
    out
}

/// Per-route dump statistics shown with `-v`
#[must_use]
pub fn render_dump_details(coverage: &ProjectCoverage) -> String {
    let mut out = String::new();
    for report in &coverage.reports {
        out.push_str(&format!(
            "Route {}: {} dump documents, {} unmatched entries, {} rejected dumps\n",
            report.route_id,
            report.documents,
            report.extra_entries,
            report.mismatches.len()
        ));
    }
    out
}

/// Render a coverage run as JSON
pub fn render_coverage_json(coverage: &ProjectCoverage) -> serde_json::Result<String> {
    serde_json::to_string_pretty(coverage)
}

/// Render discovered routes as text
#[must_use]
pub fn render_routes_text(discovery: &RouteDiscovery, indent_unit: usize) -> String {
    let mut out = String::new();
    for tree in &discovery.routes {
        out.push_str(&format!(
            "Route {} discovered in file {}\n",
            tree.route_id().unwrap_or_default(),
            tree.source_file().unwrap_or("<unknown>")
        ));
        out.push_str(&tree.dump(indent_unit));
        out.push_str("\n\n");
    }
    out.push_str(&format!("Discovered {} routes", discovery.routes.len()));
    if discovery.anonymous > 0 {
        out.push_str(&format!(", {} anonymous skipped", discovery.anonymous));
    }
    out.push('\n');
    out
}

/// Render discovered routes as JSON
pub fn render_routes_json(discovery: &RouteDiscovery) -> serde_json::Result<String> {
    let routes: Vec<serde_json::Value> = discovery.routes.iter().map(route_json).collect();
    serde_json::to_string_pretty(&serde_json::json!({
        "routes": routes,
        "anonymous": discovery.anonymous,
        "warnings": discovery.warnings,
    }))
}

fn route_json(tree: &RouteTree) -> serde_json::Value {
    let nodes: Vec<serde_json::Value> = tree
        .pre_order()
        .map(|(id, level)| {
            let node = tree.node(id);
            serde_json::json!({
                "order": node.order,
                "name": node.name,
                "level": level,
                "line_start": node.line_start,
                "line_end": node.line_end,
            })
        })
        .collect();
    serde_json::json!({
        "route_id": tree.route_id(),
        "source_file": tree.source_file(),
        "nodes": nodes,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use routecov::{EipCatalog, RouteCoverageData};

    fn tree() -> RouteTree {
        let mut tree = RouteTree::new("from");
        tree.set_route_id(Some("orders"));
        tree.set_source_file(Some("src/orders.rs"));
        let root = tree.root();
        let choice = tree.add_node(root, "choice");
        tree.add_node(choice, "when");
        tree
    }

    fn report() -> RouteCoverageReport {
        RouteCoverageReport::compare(
            &tree(),
            &RouteCoverageData::new("orders"),
            &EipCatalog::builtin(),
        )
    }

    mod output_format_tests {
        use super::*;

        #[test]
        fn test_default_format() {
            assert_eq!(OutputFormat::default(), OutputFormat::Text);
        }
    }

    mod status_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = StatusReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_quiet_mode_suppresses_output() {
            let reporter = StatusReporter::new(false, true);
            reporter.success("hidden");
            reporter.warning("hidden");
            // Failure is still printed
            reporter.failure("shown");
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_route_report_text() {
            let text = render_route_report(&report(), 2, false);
            assert!(text.starts_with("Route orders (src/orders.rs): 0/2 steps covered"));
            assert!(text.contains("1\t0\t  choice\n"));
            assert!(text.contains("2\t0\t    when\n"));
        }

        #[test]
        fn test_coverage_text_summary_line() {
            let coverage = ProjectCoverage {
                reports: vec![report()],
                anonymous: 2,
                warnings: Vec::new(),
            };
            let text = render_coverage_text(&coverage, 2, false);
            assert!(text.contains("1 routes, 0 fully covered, 1 not fully covered, 2 anonymous skipped"));
        }

        #[test]
        fn test_dump_details() {
            let coverage = ProjectCoverage {
                reports: vec![report()],
                anonymous: 0,
                warnings: Vec::new(),
            };
            assert_eq!(
                render_dump_details(&coverage),
                "Route orders: 0 dump documents, 0 unmatched entries, 0 rejected dumps\n"
            );
        }

        #[test]
        fn test_coverage_json() {
            let coverage = ProjectCoverage {
                reports: vec![report()],
                anonymous: 0,
                warnings: Vec::new(),
            };
            let json: serde_json::Value =
                serde_json::from_str(&render_coverage_json(&coverage).unwrap()).unwrap();
            assert_eq!(json["reports"][0]["route_id"], "orders");
        }

        #[test]
        fn test_routes_text_and_json() {
            let discovery = RouteDiscovery {
                routes: vec![tree()],
                anonymous: 0,
                warnings: Vec::new(),
            };
            let text = render_routes_text(&discovery, 2);
            assert!(text.contains("Route orders discovered in file src/orders.rs"));
            assert!(text.contains("0\tfrom\n1\t  choice\n2\t    when"));

            let json: serde_json::Value =
                serde_json::from_str(&render_routes_json(&discovery).unwrap()).unwrap();
            assert_eq!(json["routes"][0]["nodes"][2]["name"], "when");
            assert_eq!(json["routes"][0]["nodes"][2]["level"], 2);
        }
    }
}
