//! Abstract dataset storage for Spindle.
//!
//! The correlation stages only talk to a [`DatasetStore`]. By using a trait we
//! enable:
//! - The in-memory backend for embedded use and tests
//! - Adapters over external graph stores

use thiserror::Error;

use crate::term::{GraphName, Iri, Term, Triple};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Graph not found.
    #[error("Graph not found: {0}")]
    GraphNotFound(GraphName),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

/// A triple pattern with wildcards.
///
/// `None` in any position matches every term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriplePattern {
    /// Subject to match.
    pub subject: Option<Term>,
    /// Predicate to match.
    pub predicate: Option<Iri>,
    /// Object to match.
    pub object: Option<Term>,
}

impl TriplePattern {
    /// Pattern matching every triple.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Pattern matching every triple with the given predicate.
    #[must_use]
    pub fn with_predicate(predicate: impl Into<Iri>) -> Self {
        Self {
            predicate: Some(predicate.into()),
            ..Self::default()
        }
    }

    /// Returns true if the triple matches this pattern.
    #[must_use]
    pub fn matches(&self, triple: &Triple) -> bool {
        self.subject.as_ref().map_or(true, |s| *s == triple.subject)
            && self.predicate.as_ref().map_or(true, |p| *p == triple.predicate)
            && self.object.as_ref().map_or(true, |o| *o == triple.object)
    }
}

/// Storage trait for a dataset of named graphs.
///
/// # Ordering
/// - `graph_names` returns graphs in creation order
/// - `triples` returns matches in insertion order
///
/// # Iteration Safety
/// `triples` returns an owned snapshot. Callers may mutate the store while
/// walking a snapshot without skipping or repeating entries.
pub trait DatasetStore: Send + Sync {
    /// List graph names in creation order.
    fn graph_names(&self) -> Result<Vec<GraphName>, StorageError>;

    /// Create a graph if absent. Returns true if it was created.
    fn create_graph(&self, name: &GraphName) -> Result<bool, StorageError>;

    /// Insert a triple into a graph, creating the graph if absent.
    ///
    /// Returns false if the triple was already present.
    fn insert(&self, graph: &GraphName, triple: Triple) -> Result<bool, StorageError>;

    /// Remove a triple from a graph. Returns false if it was not present.
    ///
    /// # Errors
    /// - `GraphNotFound`: If the graph does not exist
    fn remove(&self, graph: &GraphName, triple: &Triple) -> Result<bool, StorageError>;

    /// Snapshot of the triples in a graph matching `pattern`.
    ///
    /// # Errors
    /// - `GraphNotFound`: If the graph does not exist
    fn triples(&self, graph: &GraphName, pattern: &TriplePattern) -> Result<Vec<Triple>, StorageError>;

    /// Number of triples in a graph.
    fn graph_len(&self, graph: &GraphName) -> Result<usize, StorageError>;

    /// Number of triples across all graphs.
    fn total_len(&self) -> Result<usize, StorageError> {
        let mut total = 0;
        for name in self.graph_names()? {
            total += self.graph_len(&name)?;
        }
        Ok(total)
    }

    /// Returns true if the graph exists.
    fn has_graph(&self, graph: &GraphName) -> Result<bool, StorageError> {
        Ok(self.graph_names()?.iter().any(|g| g == graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test: ensure the trait is object-safe
    fn _assert_dataset_store_object_safe(_: &dyn DatasetStore) {}

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::GraphNotFound(GraphName::new("g1"));
        assert!(err.to_string().contains("Graph not found: g1"));

        let err = StorageError::BackendError("poisoned lock".to_string());
        assert!(err.to_string().contains("poisoned lock"));
    }

    #[test]
    fn test_pattern_wildcards() {
        let t = Triple::new(Term::iri("s"), "p", Term::iri("o"));
        assert!(TriplePattern::any().matches(&t));
        assert!(TriplePattern::with_predicate("p").matches(&t));
        assert!(!TriplePattern::with_predicate("q").matches(&t));

        let by_object = TriplePattern {
            object: Some(Term::iri("o")),
            ..TriplePattern::any()
        };
        assert!(by_object.matches(&t));
    }
}
