//! Route coverage report
//!
//! Lines up a route's static tree with the counts correlated from runtime
//! dumps. Only steps the catalog recognizes take part, so the nodes zipped
//! here are exactly the ones the correlator produced entries for.

use super::correlator::{RouteCoverageData, StructuralMismatch};
use crate::catalog::StepCatalog;
use crate::node::RouteTree;
use serde::Serialize;

/// Coverage of a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeCoverage {
    /// Creation order of the tree node
    pub order: u32,
    /// Step keyword
    pub name: String,
    /// Depth below the tree root
    pub level: usize,
    /// Source line where the step starts
    pub line: Option<usize>,
    /// Executions observed in the dumps
    pub count: u64,
    /// Whether the dump entry at this position carried the same name
    pub aligned: bool,
}

impl NodeCoverage {
    /// Whether the step ran at least once
    #[must_use]
    pub fn is_covered(&self) -> bool {
        self.count > 0
    }
}

/// Coverage totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteCoverageSummary {
    /// Steps in the route
    pub total_steps: usize,
    /// Steps executed at least once
    pub covered_steps: usize,
    /// Covered share in percent
    pub coverage_percent: f64,
}

/// Coverage of one route
#[derive(Debug, Clone, Serialize)]
pub struct RouteCoverageReport {
    /// Route id
    pub route_id: String,
    /// File the route was declared in
    pub source_file: Option<String>,
    /// Per-step coverage in traversal order
    pub nodes: Vec<NodeCoverage>,
    /// Dump entries without a matching tree node
    pub extra_entries: usize,
    /// Number of runtime dumps that contained the route
    pub documents: usize,
    /// Dumps rejected during aggregation
    pub mismatches: Vec<StructuralMismatch>,
}

impl RouteCoverageReport {
    /// Zip the recognized steps of `tree` with the entries of `data`.
    ///
    /// Steps beyond the end of the dump get a count of zero.
    #[must_use]
    pub fn compare(tree: &RouteTree, data: &RouteCoverageData, catalog: &dyn StepCatalog) -> Self {
        let entries = data.entries();
        let nodes: Vec<NodeCoverage> = tree
            .pre_order()
            .map(|(id, level)| (tree.node(id), level))
            .filter(|(node, _)| catalog.is_recognized_step_name(&node.name))
            .enumerate()
            .map(|(position, (node, level))| {
                let entry = entries.get(position);
                NodeCoverage {
                    order: node.order,
                    name: node.name.clone(),
                    level,
                    line: node.line_start,
                    count: entry.map_or(0, |e| e.count),
                    aligned: entry.map_or(true, |e| e.name == node.name),
                }
            })
            .collect();

        Self {
            route_id: data.route_id.clone(),
            source_file: tree.source_file().map(str::to_string),
            extra_entries: entries.len().saturating_sub(nodes.len()),
            nodes,
            documents: data.documents.len(),
            mismatches: data.mismatches.clone(),
        }
    }

    /// Steps that never ran
    pub fn uncovered(&self) -> impl Iterator<Item = &NodeCoverage> + '_ {
        self.nodes.iter().filter(|n| !n.is_covered())
    }

    /// Whether every step ran at least once
    #[must_use]
    pub fn is_fully_covered(&self) -> bool {
        self.uncovered().next().is_none()
    }

    /// Whether the counts can be trusted to belong to the right steps
    #[must_use]
    pub fn is_reliable(&self) -> bool {
        self.mismatches.is_empty() && self.nodes.iter().all(|n| n.aligned)
    }

    /// Totals for this route
    #[must_use]
    pub fn summary(&self) -> RouteCoverageSummary {
        let total_steps = self.nodes.len();
        let covered_steps = self.nodes.iter().filter(|n| n.is_covered()).count();
        #[allow(clippy::cast_precision_loss)]
        let coverage_percent = if total_steps == 0 {
            100.0
        } else {
            covered_steps as f64 * 100.0 / total_steps as f64
        };
        RouteCoverageSummary {
            total_steps,
            covered_steps,
            coverage_percent,
        }
    }

    /// One line per step: `<order>\t<count>\t<indent><name>`
    #[must_use]
    pub fn render(&self, indent_unit: usize) -> String {
        self.nodes
            .iter()
            .map(|n| {
                format!(
                    "{}\t{}\t{}{}",
                    n.order,
                    n.count,
                    " ".repeat(n.level * indent_unit),
                    n.name
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
