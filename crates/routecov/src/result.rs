//! Result and error types for Routecov.

use thiserror::Error;

/// Result type for Routecov operations
pub type RouteCoverageResult<T> = Result<T, RouteCoverageError>;

/// Errors that can occur while building route trees or correlating coverage
#[derive(Debug, Error)]
pub enum RouteCoverageError {
    /// Markup document could not be parsed
    #[error("Failed to parse markup file {file}: {message}")]
    Markup {
        /// File that failed
        file: String,
        /// Error message
        message: String,
    },

    /// Source file could not be parsed
    #[error("Failed to parse source file {file}: {message}")]
    Source {
        /// File that failed
        file: String,
        /// Error message
        message: String,
    },

    /// An `exchangesTotal` attribute was not a non-negative integer
    #[error("Invalid exchangesTotal value {value:?} in {file}")]
    InvalidCounter {
        /// File holding the attribute
        file: String,
        /// Raw attribute value
        value: String,
    },

    /// Pre-order walk of a tree did not reproduce creation order
    #[error("Node order {found} found after order {expected_after} in pre-order walk")]
    OrderViolation {
        /// Order of the previously visited node
        expected_after: u32,
        /// Order that broke the sequence
        found: u32,
    },

    /// Step catalog could not be loaded
    #[error("Invalid step catalog: {message}")]
    Catalog {
        /// Error message
        message: String,
    },

    /// Include/exclude pattern is neither a valid glob nor a valid regex
    #[error("Invalid file pattern {pattern:?}: {message}")]
    Pattern {
        /// The offending pattern
        pattern: String,
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RouteCoverageError {
    /// Create a markup parse error
    #[must_use]
    pub fn markup(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Markup {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a source parse error
    #[must_use]
    pub fn source(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a catalog error
    #[must_use]
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }
}
