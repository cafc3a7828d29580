//! Route coverage from runtime dumps
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  dump *.xml ──→ CoverageCorrelator ──→ RouteCoverageData      │
//! │                                              │                │
//! │  RouteTree ─────────────────────────→ RouteCoverageReport     │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dumps are matched to trees by traversal position only. A dump that
//! disagrees with earlier ones about a step name is reported as a
//! [`StructuralMismatch`] and left out of the totals.

mod correlator;
mod report;

pub use correlator::{
    CoverageAccumulator, CoverageCorrelator, CoverageEntry, RouteCoverageData, StructuralMismatch,
    DUMP_EXTENSION, EXCHANGES_TOTAL,
};
pub use report::{NodeCoverage, RouteCoverageReport, RouteCoverageSummary};
