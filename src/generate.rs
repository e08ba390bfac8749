//! Generate: turn a correlation result into output triples.
//!
//! [`Generator`] is the extension point. [`ProxyGenerator`] is the one
//! implementation shipped here: it describes each cluster as a proxy
//! resource linked to its members.

use serde::{Deserialize, Serialize};

use crate::correlate::EquivalenceIndex;
use crate::storage::{DatasetStore, StorageError};
use crate::term::{GraphName, Term, Triple};
use crate::vocab;

/// Graph [`ProxyGenerator`] writes into unless told otherwise.
pub const DEFAULT_PROXY_GRAPH: &str = "urn:x-spindle:proxies";

/// Produces output triples from an equivalence index.
pub trait Generator {
    /// Generates an artifact. Must not depend on anything but `index`.
    fn generate(&self, index: &EquivalenceIndex) -> GeneratedArtifact;
}

/// Triples a generator produced, addressed to one graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    /// Target graph.
    pub graph: GraphName,
    /// Generated triples, in generation order.
    pub triples: Vec<Triple>,
}

impl GeneratedArtifact {
    /// Number of generated triples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns true if nothing was generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Inserts the artifact into `store`, creating the target graph.
    ///
    /// Returns the number of triples that were new to the store.
    pub fn write_into(&self, store: &dyn DatasetStore) -> Result<usize, StorageError> {
        store.create_graph(&self.graph)?;
        let mut added = 0;
        for triple in &self.triples {
            if store.insert(&self.graph, triple.clone())? {
                added += 1;
            }
        }
        Ok(added)
    }
}

/// Emits `<urn:uuid:cluster> owl:sameAs member` for every distinct member
/// of every cluster, clusters in mint order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyGenerator {
    graph: GraphName,
}

impl ProxyGenerator {
    /// A generator writing into `graph`.
    #[must_use]
    pub fn new(graph: impl Into<GraphName>) -> Self {
        Self { graph: graph.into() }
    }

    /// Target graph.
    #[must_use]
    pub const fn graph(&self) -> &GraphName {
        &self.graph
    }
}

impl Default for ProxyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PROXY_GRAPH)
    }
}

impl Generator for ProxyGenerator {
    fn generate(&self, index: &EquivalenceIndex) -> GeneratedArtifact {
        let same_as = vocab::owl_same_as();
        let mut triples = Vec::new();
        for cluster in index.clusters() {
            let proxy = Term::Iri(cluster.to_iri());
            for member in index.distinct_members(cluster) {
                triples.push(Triple::new(proxy.clone(), same_as.clone(), member.clone()));
            }
        }
        GeneratedArtifact {
            graph: self.graph.clone(),
            triples,
        }
    }
}
