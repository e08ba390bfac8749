//! In-memory storage backend.
//!
//! This module provides a thread-safe in-memory implementation of
//! [`DatasetStore`]. It is intended for embedded usage, tests, and as a
//! reference implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::storage::traits::{DatasetStore, StorageError, TriplePattern};
use crate::term::{GraphName, Triple};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

/// Triples of one graph, kept in insertion order.
///
/// Every triple gets a sequence number on first insert; iteration walks
/// `by_seq`, membership checks go through `seq_of`.
#[derive(Debug, Default)]
struct GraphState {
    next_seq: u64,
    seq_of: HashMap<Triple, u64>,
    by_seq: BTreeMap<u64, Triple>,
}

impl GraphState {
    fn insert(&mut self, triple: Triple) -> bool {
        if self.seq_of.contains_key(&triple) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.seq_of.insert(triple.clone(), seq);
        self.by_seq.insert(seq, triple);
        true
    }

    fn remove(&mut self, triple: &Triple) -> bool {
        let Some(seq) = self.seq_of.remove(triple) else {
            return false;
        };
        self.by_seq.remove(&seq);
        true
    }

    fn len(&self) -> usize {
        self.by_seq.len()
    }
}

#[derive(Debug, Default)]
struct DatasetState {
    order: Vec<GraphName>,
    graphs: HashMap<GraphName, GraphState>,
}

impl DatasetState {
    fn graph_mut(&mut self, name: &GraphName) -> &mut GraphState {
        if !self.graphs.contains_key(name) {
            self.order.push(name.clone());
        }
        self.graphs.entry(name.clone()).or_default()
    }
}

/// Thread-safe in-memory dataset.
///
/// Graphs are iterated in creation order and triples in insertion order,
/// which makes every stage of the pipeline reproducible for a given input.
///
/// # Examples
///
/// ```
/// use spindle::{DatasetStore, GraphName, InMemoryDataset, Term, Triple};
///
/// let store = InMemoryDataset::new();
/// let g = GraphName::new("http://example.org/g1");
/// store.insert(&g, Triple::new(Term::iri("s"), "p", Term::literal("o"))).unwrap();
/// assert_eq!(store.graph_len(&g).unwrap(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryDataset {
    state: RwLock<DatasetState>,
}

impl InMemoryDataset {
    /// Create a new empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from `(graph, triple)` pairs, in order.
    pub fn from_quads<I>(quads: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = (GraphName, Triple)>,
    {
        let store = Self::new();
        for (graph, triple) in quads {
            store.insert(&graph, triple)?;
        }
        Ok(store)
    }
}

impl DatasetStore for InMemoryDataset {
    fn graph_names(&self) -> Result<Vec<GraphName>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("dataset.graph_names"))?;
        Ok(state.order.clone())
    }

    fn create_graph(&self, name: &GraphName) -> Result<bool, StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("dataset.create_graph"))?;
        if state.graphs.contains_key(name) {
            return Ok(false);
        }
        state.graph_mut(name);
        Ok(true)
    }

    fn insert(&self, graph: &GraphName, triple: Triple) -> Result<bool, StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("dataset.insert"))?;
        Ok(state.graph_mut(graph).insert(triple))
    }

    fn remove(&self, graph: &GraphName, triple: &Triple) -> Result<bool, StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("dataset.remove"))?;
        let g = state
            .graphs
            .get_mut(graph)
            .ok_or_else(|| StorageError::GraphNotFound(graph.clone()))?;
        Ok(g.remove(triple))
    }

    fn triples(&self, graph: &GraphName, pattern: &TriplePattern) -> Result<Vec<Triple>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("dataset.triples"))?;
        let g = state
            .graphs
            .get(graph)
            .ok_or_else(|| StorageError::GraphNotFound(graph.clone()))?;
        Ok(g.by_seq
            .values()
            .filter(|t| pattern.matches(t))
            .cloned()
            .collect())
    }

    fn graph_len(&self, graph: &GraphName) -> Result<usize, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("dataset.graph_len"))?;
        state
            .graphs
            .get(graph)
            .map(GraphState::len)
            .ok_or_else(|| StorageError::GraphNotFound(graph.clone()))
    }

    fn has_graph(&self, graph: &GraphName) -> Result<bool, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("dataset.has_graph"))?;
        Ok(state.graphs.contains_key(graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;

    fn t(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(Term::iri(s), p, Term::iri(o))
    }

    #[test]
    fn test_insert_is_set_semantics() {
        let store = InMemoryDataset::new();
        let g = GraphName::new("g");
        assert!(store.insert(&g, t("a", "p", "b")).unwrap());
        assert!(!store.insert(&g, t("a", "p", "b")).unwrap());
        assert_eq!(store.graph_len(&g).unwrap(), 1);
    }

    #[test]
    fn test_graphs_in_creation_order() {
        let store = InMemoryDataset::new();
        for name in ["z", "a", "m"] {
            store.create_graph(&GraphName::new(name)).unwrap();
        }
        store.insert(&GraphName::new("a"), t("s", "p", "o")).unwrap();
        let names: Vec<String> = store
            .graph_names()
            .unwrap()
            .iter()
            .map(|g| g.as_str().to_string())
            .collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_triples_in_insertion_order_after_removal() {
        let store = InMemoryDataset::new();
        let g = GraphName::new("g");
        store.insert(&g, t("c", "p", "1")).unwrap();
        store.insert(&g, t("a", "p", "2")).unwrap();
        store.insert(&g, t("b", "p", "3")).unwrap();
        assert!(store.remove(&g, &t("a", "p", "2")).unwrap());
        // Re-inserting goes to the back.
        store.insert(&g, t("a", "p", "2")).unwrap();

        let subjects: Vec<String> = store
            .triples(&g, &TriplePattern::any())
            .unwrap()
            .into_iter()
            .map(|t| t.subject.to_string())
            .collect();
        assert_eq!(subjects, vec!["<c>", "<b>", "<a>"]);
    }

    #[test]
    fn test_remove_unknown_graph() {
        let store = InMemoryDataset::new();
        let err = store
            .remove(&GraphName::new("missing"), &t("a", "p", "b"))
            .unwrap_err();
        assert!(matches!(err, StorageError::GraphNotFound(_)));
    }

    #[test]
    fn test_create_graph_is_idempotent() {
        let store = InMemoryDataset::new();
        let g = GraphName::new("g");
        assert!(store.create_graph(&g).unwrap());
        assert!(!store.create_graph(&g).unwrap());
        assert_eq!(store.graph_len(&g).unwrap(), 0);
        assert!(store.has_graph(&g).unwrap());
    }

    #[test]
    fn test_total_len_sums_graphs() {
        let store = InMemoryDataset::from_quads(vec![
            (GraphName::new("g1"), t("a", "p", "b")),
            (GraphName::new("g2"), t("a", "p", "b")),
            (GraphName::new("g2"), t("b", "p", "c")),
        ])
        .unwrap();
        assert_eq!(store.total_len().unwrap(), 3);
    }

    #[test]
    fn test_pattern_filtering() {
        let store = InMemoryDataset::new();
        let g = GraphName::new("g");
        store.insert(&g, t("a", "p", "b")).unwrap();
        store.insert(&g, t("a", "q", "b")).unwrap();
        let only_q = store.triples(&g, &TriplePattern::with_predicate("q")).unwrap();
        assert_eq!(only_q, vec![t("a", "q", "b")]);
    }
}
