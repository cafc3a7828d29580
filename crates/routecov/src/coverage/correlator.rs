//! Coverage Correlator
//!
//! Reads runtime-dump documents and accumulates, per route id, the execution
//! count of every routing step in traversal order.
//!
//! Dumps carry no node identifiers, so steps are matched purely by position:
//! the walk below must stay identical to the one used by the tree builders
//! (depth-first, route wrapper skipped, element children only).

use crate::catalog::StepCatalog;
use crate::markup::ROUTE_ELEMENT;
use crate::result::{RouteCoverageError, RouteCoverageResult};
use roxmltree::{Document, Node};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Attribute holding a step's execution count
pub const EXCHANGES_TOTAL: &str = "exchangesTotal";

/// File extension of runtime dumps
pub const DUMP_EXTENSION: &str = "xml";

/// Accumulated execution count of one routing step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageEntry {
    /// Step keyword as it appeared in the dump
    pub name: String,
    /// Sum of `exchangesTotal` over all contributing documents
    pub count: u64,
}

impl CoverageEntry {
    /// Create an entry
    #[must_use]
    pub fn new(name: &str, count: u64) -> Self {
        Self {
            name: name.to_string(),
            count,
        }
    }
}

/// A dump disagreed with earlier dumps about which step sits at a position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuralMismatch {
    /// Route being aggregated
    pub route_id: String,
    /// Zero-based traversal position
    pub position: usize,
    /// Name already accumulated at the position
    pub expected: String,
    /// Name found in the rejected dump
    pub found: String,
    /// Document that was rejected
    pub origin: Option<PathBuf>,
}

impl std::fmt::Display for StructuralMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "route {} position {}: expected step {:?} but found {:?}",
            self.route_id, self.position, self.expected, self.found
        )?;
        if let Some(origin) = &self.origin {
            write!(f, " in {}", origin.display())?;
        }
        Ok(())
    }
}

/// Position-addressed accumulation of step counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageAccumulator {
    entries: Vec<CoverageEntry>,
}

impl CoverageAccumulator {
    /// Create an empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated entries in traversal order
    #[must_use]
    pub fn entries(&self) -> &[CoverageEntry] {
        &self.entries
    }

    /// Merge the steps of one route element.
    ///
    /// Positions already present must carry the same name; their counts are
    /// summed. New positions are appended. The merge is all-or-nothing: on a
    /// name mismatch nothing is changed and the first mismatching position is
    /// returned.
    pub fn merge(&mut self, steps: &[CoverageEntry]) -> Result<(), (usize, String, String)> {
        for (position, (existing, step)) in self.entries.iter().zip(steps).enumerate() {
            if existing.name != step.name {
                return Err((position, existing.name.clone(), step.name.clone()));
            }
        }
        for (position, step) in steps.iter().enumerate() {
            match self.entries.get_mut(position) {
                Some(existing) => existing.count = existing.count.saturating_add(step.count),
                None => self.entries.push(step.clone()),
            }
        }
        Ok(())
    }
}

/// Everything collected for one route id
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteCoverageData {
    /// Route id
    pub route_id: String,
    /// Accumulated step counts
    pub accumulator: CoverageAccumulator,
    /// Route elements merged
    pub contributions: usize,
    /// Documents that contained the route id
    pub documents: Vec<PathBuf>,
    /// Dumps rejected for disagreeing with earlier ones
    pub mismatches: Vec<StructuralMismatch>,
    /// Documents that could not be read or parsed, with the cause
    pub skipped: Vec<(PathBuf, String)>,
}

impl RouteCoverageData {
    /// Empty data for a route id
    #[must_use]
    pub fn new(route_id: &str) -> Self {
        Self {
            route_id: route_id.to_string(),
            ..Self::default()
        }
    }

    /// Accumulated entries in traversal order
    #[must_use]
    pub fn entries(&self) -> &[CoverageEntry] {
        self.accumulator.entries()
    }

    /// Counts only, in traversal order
    #[must_use]
    pub fn counts(&self) -> Vec<u64> {
        self.entries().iter().map(|e| e.count).collect()
    }

    /// Whether no dump disagreed with another
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Correlates runtime dumps with a route id
pub struct CoverageCorrelator<'a> {
    catalog: &'a dyn StepCatalog,
}

impl std::fmt::Debug for CoverageCorrelator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverageCorrelator").finish_non_exhaustive()
    }
}

impl<'a> CoverageCorrelator<'a> {
    /// Create a correlator using `catalog` to recognize steps
    #[must_use]
    pub fn new(catalog: &'a dyn StepCatalog) -> Self {
        Self { catalog }
    }

    /// Correlate every dump document in `dir` with `route_id`.
    ///
    /// A missing directory yields empty data. Documents that fail to parse
    /// are recorded as skipped and logged; they never abort the run.
    pub fn correlate_dir(&self, dir: &Path, route_id: &str) -> RouteCoverageResult<RouteCoverageData> {
        let mut data = RouteCoverageData::new(route_id);
        for file in dump_files(dir)? {
            let result = std::fs::read_to_string(&file)
                .map_err(RouteCoverageError::from)
                .and_then(|source| self.correlate_document(&source, Some(&file), route_id, &mut data));
            if let Err(e) = result {
                warn!(file = %file.display(), error = %e, "skipping runtime dump");
                data.skipped.push((file, e.to_string()));
            }
        }
        Ok(data)
    }

    /// Correlate one document, adding its matching routes to `data`
    pub fn correlate_document(
        &self,
        source: &str,
        origin: Option<&Path>,
        route_id: &str,
        data: &mut RouteCoverageData,
    ) -> RouteCoverageResult<()> {
        let file_name = origin.map_or_else(|| "<memory>".to_string(), |p| p.display().to_string());
        let doc = Document::parse(source)
            .map_err(|e| RouteCoverageError::markup(file_name.clone(), e.to_string()))?;

        // Collect every matching route first so a bad counter rejects the whole document.
        let mut routes = Vec::new();
        for route in doc.descendants().filter(|n| {
            n.is_element()
                && n.tag_name().name() == ROUTE_ELEMENT
                && n.attribute("id") == Some(route_id)
        }) {
            let mut steps = Vec::new();
            self.collect_steps(route, &file_name, &mut steps)?;
            routes.push(steps);
        }

        if routes.is_empty() {
            return Ok(());
        }
        if let Some(origin) = origin {
            data.documents.push(origin.to_path_buf());
        }

        for steps in routes {
            match data.accumulator.merge(&steps) {
                Ok(()) => data.contributions += 1,
                Err((position, expected, found)) => {
                    let mismatch = StructuralMismatch {
                        route_id: route_id.to_string(),
                        position,
                        expected,
                        found,
                        origin: origin.map(Path::to_path_buf),
                    };
                    warn!(%mismatch, "runtime dump disagrees with earlier dumps, not aggregated");
                    data.mismatches.push(mismatch);
                }
            }
        }
        debug!(route_id, file = %file_name, entries = data.entries().len(), "correlated runtime dump");
        Ok(())
    }

    /// Depth-first walk of a route element; recognized steps in traversal order
    fn collect_steps(
        &self,
        element: Node<'_, '_>,
        file_name: &str,
        steps: &mut Vec<CoverageEntry>,
    ) -> RouteCoverageResult<()> {
        let name = element.tag_name().name();
        if name != ROUTE_ELEMENT && self.catalog.is_recognized_step_name(name) {
            let count = match element.attribute(EXCHANGES_TOTAL) {
                Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                    RouteCoverageError::InvalidCounter {
                        file: file_name.to_string(),
                        value: raw.to_string(),
                    }
                })?,
                None => 0,
            };
            steps.push(CoverageEntry::new(name, count));
        }
        for child in element.children().filter(Node::is_element) {
            self.collect_steps(child, file_name, steps)?;
        }
        Ok(())
    }
}

/// Dump documents of a directory, sorted by name
fn dump_files(dir: &Path) -> RouteCoverageResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "no runtime dump directory");
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == DUMP_EXTENSION)
        })
        .collect();
    files.sort();
    Ok(files)
}
