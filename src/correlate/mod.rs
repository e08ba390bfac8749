//! Correlate: cluster entities linked by `owl:sameAs`.
//!
//! Equivalence triples are processed graph by graph (store order), triple
//! by triple (insertion order). For a fixed input and a
//! [`SequentialMinter`] the resulting index is identical on every run; with
//! the random minter only the identifiers change.
//!
//! Two merge strategies are available:
//! - [`MergeStrategy::FirstProxy`] reuses the subject's cluster, else the
//!   object's, else mints one. When both sides already sit in *different*
//!   clusters they are not merged: the object is re-pointed at the
//!   subject's cluster and the object's old cluster keeps its stale
//!   member entries.
//! - [`MergeStrategy::UnionFind`] merges the two clusters instead, so
//!   every connected component ends up under one identifier.
//!
//! Both strategies give the same index as long as no triple links two
//! already-existing clusters.

mod disjoint;
mod index;
mod minter;

use serde::{Deserialize, Serialize};

use crate::observer::{PipelineEvent, PipelineObserver};
use crate::storage::{DatasetStore, StorageError, TriplePattern};
use crate::term::Term;
use crate::vocab;

use disjoint::DisjointSet;

pub use index::{ClusterId, ClusterSummary, EquivalenceIndex};
pub use minter::{IdMinter, IdStrategy, RandomMinter, SequentialMinter};

/// How equivalence triples touching two existing clusters are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Prefer the subject's existing cluster, else the object's; never
    /// merge two existing clusters.
    #[default]
    FirstProxy,
    /// Merge clusters with a disjoint-set; the older cluster survives.
    UnionFind,
}

/// Correlation settings for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Correlator {
    strategy: MergeStrategy,
    ids: IdStrategy,
}

impl Correlator {
    /// Creates a correlator.
    #[must_use]
    pub const fn new(strategy: MergeStrategy, ids: IdStrategy) -> Self {
        Self { strategy, ids }
    }

    /// Runs one correlation pass over `store` with a fresh minter.
    pub fn run(
        &self,
        store: &dyn DatasetStore,
        observer: &dyn PipelineObserver,
    ) -> Result<EquivalenceIndex, StorageError> {
        let mut minter = self.ids.minter();
        correlate(store, minter.as_mut(), self.strategy, observer)
    }
}

/// Builds the equivalence index for every `owl:sameAs` triple in `store`.
///
/// The store is only read. Literal objects are clustered like any other
/// term.
pub fn correlate(
    store: &dyn DatasetStore,
    minter: &mut dyn IdMinter,
    strategy: MergeStrategy,
    observer: &dyn PipelineObserver,
) -> Result<EquivalenceIndex, StorageError> {
    observer.on_event(&PipelineEvent::CorrelateStarted);

    let mut run = Run {
        index: EquivalenceIndex::new(),
        sets: DisjointSet::default(),
        strategy,
    };

    let same_as = TriplePattern::with_predicate(vocab::owl_same_as());
    for graph in store.graph_names()? {
        for triple in store.triples(&graph, &same_as)? {
            run.link(&triple.subject, &triple.object, minter, observer);
        }
    }

    let index = run.finish();
    observer.on_event(&PipelineEvent::CorrelateFinished {
        clusters: index.cluster_count(),
        entities: index.entity_count(),
    });
    Ok(index)
}

struct Run {
    index: EquivalenceIndex,
    sets: DisjointSet,
    strategy: MergeStrategy,
}

impl Run {
    fn mint(&mut self, minter: &mut dyn IdMinter) -> ClusterId {
        loop {
            let id = minter.mint();
            if self.index.register(id) {
                self.sets.make_set(id);
                return id;
            }
        }
    }

    fn lookup(&mut self, entity: &Term) -> Option<ClusterId> {
        let id = self.index.proxy_of(entity)?;
        Some(match self.strategy {
            MergeStrategy::FirstProxy => id,
            MergeStrategy::UnionFind => self.sets.find(id),
        })
    }

    fn link(
        &mut self,
        subject: &Term,
        object: &Term,
        minter: &mut dyn IdMinter,
        observer: &dyn PipelineObserver,
    ) {
        let from_subject = self.lookup(subject);
        let from_object = self.lookup(object);

        let (cluster, minted) = match (from_subject, from_object, self.strategy) {
            (Some(s), Some(o), MergeStrategy::UnionFind) if s != o => {
                (self.merge(s, o, observer), false)
            }
            (Some(s), _, _) => (s, false),
            (None, Some(o), _) => (o, false),
            (None, None, _) => (self.mint(minter), true),
        };

        self.index.link(subject, object, cluster);
        observer.on_event(&PipelineEvent::EquivalenceLinked {
            subject: subject.clone(),
            object: object.clone(),
            cluster,
            minted,
        });
    }

    fn merge(&mut self, a: ClusterId, b: ClusterId, observer: &dyn PipelineObserver) -> ClusterId {
        let Some((survivor, absorbed)) = self.sets.union(a, b) else {
            return self.sets.find(a);
        };
        self.index.absorb(survivor, absorbed);
        observer.on_event(&PipelineEvent::ClustersMerged { survivor, absorbed });
        survivor
    }

    fn finish(mut self) -> EquivalenceIndex {
        if self.strategy == MergeStrategy::UnionFind {
            let sets = &mut self.sets;
            self.index.repoint(|id| sets.find(id));
        }
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{NullObserver, RecordingObserver};
    use crate::storage::InMemoryDataset;
    use crate::term::{GraphName, Triple};
    use crate::vocab::OWL_SAME_AS;

    fn same_as(s: &str, o: &str) -> Triple {
        Triple::new(Term::iri(s), OWL_SAME_AS, Term::iri(o))
    }

    fn store(triples: Vec<Triple>) -> InMemoryDataset {
        let g = GraphName::new("g1");
        InMemoryDataset::from_quads(triples.into_iter().map(|t| (g.clone(), t))).unwrap()
    }

    fn run(store: &InMemoryDataset, strategy: MergeStrategy) -> EquivalenceIndex {
        correlate(store, &mut SequentialMinter::new(), strategy, &NullObserver).unwrap()
    }

    #[test]
    fn test_chain_shares_one_cluster() {
        let store = store(vec![same_as("a", "b"), same_as("b", "c")]);
        let index = run(&store, MergeStrategy::FirstProxy);

        let x = index.proxy_of(&Term::iri("a")).unwrap();
        assert_eq!(index.proxy_of(&Term::iri("b")), Some(x));
        assert_eq!(index.proxy_of(&Term::iri("c")), Some(x));
        assert_eq!(
            index.members_of(x).unwrap(),
            &[Term::iri("a"), Term::iri("b"), Term::iri("b"), Term::iri("c")]
        );
        assert_eq!(index.cluster_count(), 1);
    }

    #[test]
    fn test_new_pair_mints_exactly_one() {
        let store = store(vec![same_as("a", "b"), same_as("c", "d")]);
        let obs = RecordingObserver::new();
        let index = correlate(&store, &mut SequentialMinter::new(), MergeStrategy::FirstProxy, &obs).unwrap();
        assert_eq!(index.cluster_count(), 2);
        assert_eq!(
            obs.count(|e| matches!(e, PipelineEvent::EquivalenceLinked { minted: true, .. })),
            2
        );
    }

    #[test]
    fn test_object_reuses_subject_cluster() {
        let store = store(vec![same_as("a", "b"), same_as("a", "z")]);
        let index = run(&store, MergeStrategy::FirstProxy);
        assert_eq!(index.cluster_count(), 1);
        assert_eq!(
            index.proxy_of(&Term::iri("z")),
            index.proxy_of(&Term::iri("a"))
        );
    }

    #[test]
    fn test_first_proxy_does_not_merge_existing_clusters() {
        let store = store(vec![same_as("a", "b"), same_as("c", "d"), same_as("b", "d")]);
        let index = run(&store, MergeStrategy::FirstProxy);

        let first = ClusterId::from_sequence(1);
        let second = ClusterId::from_sequence(2);
        assert_eq!(index.cluster_count(), 2);
        assert_eq!(index.proxy_of(&Term::iri("d")), Some(first));
        // c was never re-pointed, and d's entry in the second cluster is stale.
        assert_eq!(index.proxy_of(&Term::iri("c")), Some(second));
        assert_eq!(
            index.members_of(second).unwrap(),
            &[Term::iri("c"), Term::iri("d")]
        );
    }

    #[test]
    fn test_union_find_merges_existing_clusters() {
        let store = store(vec![same_as("a", "b"), same_as("c", "d"), same_as("b", "d")]);
        let obs = RecordingObserver::new();
        let index = correlate(&store, &mut SequentialMinter::new(), MergeStrategy::UnionFind, &obs).unwrap();

        let first = ClusterId::from_sequence(1);
        assert_eq!(index.cluster_count(), 1);
        for e in ["a", "b", "c", "d"] {
            assert_eq!(index.proxy_of(&Term::iri(e)), Some(first), "entity {e}");
        }
        assert_eq!(
            index.members_of(first).unwrap(),
            &[
                Term::iri("a"),
                Term::iri("b"),
                Term::iri("c"),
                Term::iri("d"),
                Term::iri("b"),
                Term::iri("d"),
            ]
        );
        assert_eq!(
            obs.count(|e| matches!(e, PipelineEvent::ClustersMerged { .. })),
            1
        );
    }

    #[test]
    fn test_strategies_agree_without_cross_cluster_links() {
        let store = store(vec![
            same_as("a", "b"),
            same_as("b", "c"),
            same_as("x", "y"),
            same_as("c", "a"),
        ]);
        assert_eq!(
            run(&store, MergeStrategy::FirstProxy),
            run(&store, MergeStrategy::UnionFind)
        );
    }

    #[test]
    fn test_literal_object_is_clustered() {
        let store = store(vec![Triple::new(Term::iri("a"), OWL_SAME_AS, Term::literal("A"))]);
        let index = run(&store, MergeStrategy::FirstProxy);
        assert_eq!(
            index.proxy_of(&Term::literal("A")),
            index.proxy_of(&Term::iri("a"))
        );
    }

    #[test]
    fn test_ignores_other_predicates_and_does_not_mutate() {
        let store = store(vec![
            Triple::new(Term::iri("a"), "http://example.org/knows", Term::iri("b")),
            same_as("a", "c"),
        ]);
        let before = crate::storage::fingerprint(&store).unwrap();
        let index = run(&store, MergeStrategy::FirstProxy);
        assert_eq!(index.entity_count(), 2);
        assert!(index.proxy_of(&Term::iri("b")).is_none());
        assert_eq!(before, crate::storage::fingerprint(&store).unwrap());
    }

    #[test]
    fn test_graph_order_then_insertion_order() {
        let g1 = GraphName::new("g1");
        let g2 = GraphName::new("g2");
        let store = InMemoryDataset::from_quads(vec![
            (g2.clone(), same_as("p", "q")),
            (g1.clone(), same_as("a", "b")),
            (g2, same_as("a", "p")),
        ])
        .unwrap();
        // g2 was created first, so p=q mints cluster 1 and a=p reuses it;
        // a=b in g1 then finds a's proxy.
        let index = run(&store, MergeStrategy::FirstProxy);
        let first = ClusterId::from_sequence(1);
        assert_eq!(index.cluster_count(), 1);
        assert_eq!(index.proxy_of(&Term::iri("b")), Some(first));
    }

    #[test]
    fn test_correlator_with_random_ids_has_same_shape() {
        let store = store(vec![same_as("a", "b"), same_as("c", "d")]);
        let index = Correlator::new(MergeStrategy::FirstProxy, IdStrategy::Random)
            .run(&store, &NullObserver)
            .unwrap();
        assert_eq!(index.cluster_count(), 2);
        assert_ne!(
            index.proxy_of(&Term::iri("a")),
            index.proxy_of(&Term::iri("c"))
        );
    }
}
