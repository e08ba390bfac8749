//! The equivalence index produced by one correlation run.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::term::{Iri, Term};

/// Opaque canonical identifier of an equivalence cluster.
///
/// Unique within one correlation run; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(Uuid);

impl ClusterId {
    /// Creates a new random cluster ID.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Cluster ID for a per-run sequence number.
    #[must_use]
    pub const fn from_sequence(n: u128) -> Self {
        Self(Uuid::from_u128(n))
    }

    /// Returns true if this is the nil UUID.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// The cluster as a `urn:uuid:` IRI.
    #[must_use]
    pub fn to_iri(&self) -> Iri {
        Iri::new(self.0.urn().to_string())
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entity → cluster and cluster → members maps of one correlation run.
///
/// `members_of` keeps append order and duplicates exactly as the equivalence
/// triples were processed: a chain `a=b, b=c` yields `[a, b, b, c]`.
/// [`EquivalenceIndex::distinct_members`] gives the deduplicated view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquivalenceIndex {
    proxy_of: HashMap<Term, ClusterId>,
    members_of: HashMap<ClusterId, Vec<Term>>,
    order: Vec<ClusterId>,
}

impl EquivalenceIndex {
    /// An empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical cluster of an entity, if any equivalence touched it.
    #[must_use]
    pub fn proxy_of(&self, entity: &Term) -> Option<ClusterId> {
        self.proxy_of.get(entity).copied()
    }

    /// Members of a cluster in append order, duplicates included.
    #[must_use]
    pub fn members_of(&self, cluster: ClusterId) -> Option<&[Term]> {
        self.members_of.get(&cluster).map(Vec::as_slice)
    }

    /// Members of a cluster in first-occurrence order, without duplicates.
    #[must_use]
    pub fn distinct_members(&self, cluster: ClusterId) -> Vec<&Term> {
        let mut seen = HashSet::new();
        self.members_of
            .get(&cluster)
            .into_iter()
            .flatten()
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// Cluster IDs in mint order.
    pub fn clusters(&self) -> impl Iterator<Item = ClusterId> + '_ {
        self.order.iter().copied()
    }

    /// Number of clusters.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.order.len()
    }

    /// Number of entities with a proxy.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.proxy_of.len()
    }

    /// Returns true if no equivalence was processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Owned per-cluster view, in mint order, for reports.
    #[must_use]
    pub fn summaries(&self) -> Vec<ClusterSummary> {
        self.order
            .iter()
            .map(|id| ClusterSummary {
                id: *id,
                members: self.members_of.get(id).cloned().unwrap_or_default(),
            })
            .collect()
    }

    pub(crate) fn register(&mut self, cluster: ClusterId) -> bool {
        if self.members_of.contains_key(&cluster) {
            return false;
        }
        self.members_of.insert(cluster, Vec::new());
        self.order.push(cluster);
        true
    }

    pub(crate) fn link(&mut self, subject: &Term, object: &Term, cluster: ClusterId) {
        self.proxy_of.insert(subject.clone(), cluster);
        self.proxy_of.insert(object.clone(), cluster);
        let members = self.members_of.entry(cluster).or_default();
        members.push(subject.clone());
        members.push(object.clone());
    }

    /// Folds `absorbed`'s members onto the end of `survivor`'s list and
    /// forgets `absorbed`. `proxy_of` entries are left for the caller.
    pub(crate) fn absorb(&mut self, survivor: ClusterId, absorbed: ClusterId) {
        let moved = self.members_of.remove(&absorbed).unwrap_or_default();
        self.members_of.entry(survivor).or_default().extend(moved);
        self.order.retain(|id| *id != absorbed);
    }

    pub(crate) fn repoint(&mut self, mut resolve: impl FnMut(ClusterId) -> ClusterId) {
        for cluster in self.proxy_of.values_mut() {
            *cluster = resolve(*cluster);
        }
    }
}

/// One cluster and its members (append order, duplicates included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    /// Cluster identifier.
    pub id: ClusterId,
    /// Members in append order.
    pub members: Vec<Term>,
}
