//! Routecov: Route Coverage for Integration Routes
//!
//! Builds a static tree of every routing step a project declares, either in
//! fluent route-builder source or in route markup, and lines it up with the
//! per-step execution counts that test runs dump to disk.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    ROUTECOV Architecture                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐                              │
//! │   │ *.rs       │───►│ source     │──┐                           │
//! │   └────────────┘    └────────────┘  │   ┌────────────┐          │
//! │                                     ├──►│ RouteTree  │──┐       │
//! │   ┌────────────┐    ┌────────────┐  │   └────────────┘  │       │
//! │   │ *.xml      │───►│ markup     │──┘                   ▼       │
//! │   └────────────┘    └────────────┘          ┌──────────────────┐│
//! │   ┌────────────┐    ┌────────────┐          │ RouteCoverage    ││
//! │   │ dumps      │───►│ correlator │─────────►│ Report           ││
//! │   └────────────┘    └────────────┘          └──────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use routecov::{parse_route_builder, EipCatalog, RustSourceUnit};
//!
//! let source = r#"
//! impl RouteBuilder for Orders {
//!     fn configure(&self, r: &mut Routes) {
//!         r.from("direct:orders").route_id("orders").to("mock:a");
//!     }
//! }
//! "#;
//! let unit = RustSourceUnit::parse(source, "src/orders.rs").unwrap();
//! let tree = parse_route_builder(&unit, false, &EipCatalog::builtin())
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(tree.route_id(), Some("orders"));
//! assert_eq!(tree.dump(2), "0\tfrom\n1\t  to");
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

/// Project discovery and coverage runs
#[allow(clippy::missing_errors_doc)]
pub mod analysis;

/// Routing-step catalog
#[allow(clippy::missing_errors_doc)]
pub mod catalog;

/// Runtime dump correlation and coverage reports
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod coverage;

/// File discovery and include/exclude filtering
#[allow(clippy::missing_errors_doc)]
pub mod discovery;

/// Markup route tree builder
#[allow(clippy::missing_errors_doc)]
pub mod markup;

/// Route node tree model
pub mod node;

/// Source route tree builder
#[allow(clippy::missing_errors_doc)]
pub mod source;

mod result;

pub use analysis::{
    analyze_project, discover_routes, CoverageOptions, FileWarning, ProjectCoverage,
    RouteDiscovery, DEFAULT_DUMP_DIR,
};
pub use catalog::{EipCatalog, StepCatalog, BUILTIN_CATALOG_VERSION};
pub use coverage::{
    CoverageAccumulator, CoverageCorrelator, CoverageEntry, NodeCoverage, RouteCoverageData,
    RouteCoverageReport, RouteCoverageSummary, StructuralMismatch,
};
pub use discovery::{discover_files, DiscoveredFile, FileFilter, ProjectLayout};
pub use markup::{build_markup_route_tree, parse_markup_routes, MARKUP_ENTRY_NAME};
pub use node::{NodeId, RouteNode, RouteTree};
pub use result::{RouteCoverageError, RouteCoverageResult};
pub use source::{
    build_route_tree, parse_route_builder, parse_route_builder_trees, CallArg, CallNode,
    EntryMethod, RustSourceUnit, SourceUnit,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::analysis::*;
    pub use super::catalog::*;
    pub use super::coverage::*;
    pub use super::discovery::*;
    pub use super::markup::*;
    pub use super::node::*;
    pub use super::result::*;
    pub use super::source::*;
}
