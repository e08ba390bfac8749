//! Error types for Spindle.
//!
//! All errors are strongly typed using thiserror. Absence is never an error:
//! a predicate missing from the rulebase, an entity without a proxy, or a
//! graph without license triples all have defined fallback behaviour.

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::StorageError;
use crate::term::GraphName;

/// Errors raised while reading a serialized graph document.
///
/// Load errors are fatal: the pipeline aborts before any stage runs.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Syntax error in {source_name}: {message}")]
    Syntax {
        source_name: String,
        message: String,
    },

    #[error("Unsupported format '{name}'")]
    UnsupportedFormat {
        name: String,
    },

    #[error("Rule graph {graph} not found in the rule document")]
    RuleGraphNotFound {
        graph: GraphName,
    },

    #[error("Store rejected loaded data: {0}")]
    Store(#[from] StorageError),
}

/// Errors raised while reading or checking pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    Parse {
        message: String,
    },

    #[error("Invalid config field '{field}': {reason}")]
    Invalid {
        field: String,
        reason: String,
    },
}

/// Top-level error type for Spindle.
#[derive(Debug, Error)]
pub enum SpindleError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Store access error: {0}")]
    Store(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpindleError {
    /// Returns true if this is a load error.
    #[must_use]
    pub const fn is_load(&self) -> bool {
        matches!(self, Self::Load(_))
    }

    /// Returns true if this is a store access error.
    #[must_use]
    pub const fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if the error can only occur before any stage mutates
    /// the dataset.
    #[must_use]
    pub const fn is_fatal_before_stages(&self) -> bool {
        matches!(self, Self::Load(_) | Self::Config(_))
    }
}

/// Result type alias for Spindle operations.
pub type SpindleResult<T> = Result<T, SpindleError>;
