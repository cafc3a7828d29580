//! Routing-step catalog
//!
//! Answers one question for the builders and the correlator: is a given
//! element or call name a recognized routing step (EIP)? The built-in list is
//! versioned; projects that use custom steps load their own catalog from JSON.

use crate::result::{RouteCoverageError, RouteCoverageResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Version of the built-in keyword list
pub const BUILTIN_CATALOG_VERSION: &str = "2.20";

/// Known routing-step keywords. `route` and `from` are structural, not steps.
const BUILTIN_STEP_NAMES: &[&str] = &[
    "aggregate",
    "bean",
    "choice",
    "circuitBreaker",
    "claimCheck",
    "convertBodyTo",
    "convertHeaderTo",
    "delay",
    "doCatch",
    "doFinally",
    "doTry",
    "dynamicRouter",
    "enrich",
    "filter",
    "idempotentConsumer",
    "inOnly",
    "inOut",
    "intercept",
    "kamelet",
    "loadBalance",
    "log",
    "loop",
    "marshal",
    "multicast",
    "onCompletion",
    "onException",
    "onFallback",
    "otherwise",
    "pipeline",
    "policy",
    "pollEnrich",
    "process",
    "recipientList",
    "removeHeader",
    "removeHeaders",
    "removeProperty",
    "resequence",
    "rollback",
    "routingSlip",
    "saga",
    "sample",
    "script",
    "serviceCall",
    "setBody",
    "setExchangePattern",
    "setHeader",
    "setProperty",
    "sort",
    "split",
    "step",
    "stop",
    "threads",
    "throttle",
    "throwException",
    "to",
    "toD",
    "transacted",
    "transform",
    "unmarshal",
    "validate",
    "when",
    "whenSkipSendToEndpoint",
    "wireTap",
];

/// Lookup of recognized routing-step names
pub trait StepCatalog {
    /// Whether `name` is a routing-step keyword
    fn is_recognized_step_name(&self, name: &str) -> bool;
}

impl<F> StepCatalog for F
where
    F: Fn(&str) -> bool,
{
    fn is_recognized_step_name(&self, name: &str) -> bool {
        self(name)
    }
}

/// Versioned set of routing-step keywords
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EipCatalog {
    /// Catalog version
    pub version: String,
    /// Recognized names
    pub names: BTreeSet<String>,
}

impl Default for EipCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EipCatalog {
    /// The built-in catalog
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            version: BUILTIN_CATALOG_VERSION.to_string(),
            names: BUILTIN_STEP_NAMES.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Parse a catalog from `{"version": "...", "names": [...]}`
    pub fn from_json(json: &str) -> RouteCoverageResult<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        if catalog.names.is_empty() {
            return Err(RouteCoverageError::catalog("catalog lists no step names"));
        }
        if catalog.names.contains("route") {
            return Err(RouteCoverageError::catalog(
                "\"route\" is the route wrapper and cannot be a step name",
            ));
        }
        Ok(catalog)
    }

    /// Load a catalog file
    pub fn load(path: &Path) -> RouteCoverageResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Add extra names (custom steps)
    #[must_use]
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Number of known names
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl StepCatalog for EipCatalog {
    fn is_recognized_step_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}
