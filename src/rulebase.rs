//! The rulebase: which relations survive stripping.
//!
//! The whitelist always holds `rdf:type` and `owl:sameAs`. Every
//! `spindle:expressedAs` triple in the rule graph adds both its subject and
//! its object, so class IRIs and predicate IRIs end up in the same set. Only
//! the predicate test in [`Rulebase::is_whitelisted`] consults it.

use std::collections::BTreeSet;

use crate::storage::{DatasetStore, StorageError, TriplePattern};
use crate::term::{GraphName, Iri, Term, Triple};
use crate::vocab;

/// Whitelist of recognized relations. Immutable once built.
///
/// # Examples
///
/// ```
/// use spindle::{Iri, Rulebase, Term, Triple};
/// use spindle::vocab::SPINDLE_EXPRESSED_AS;
///
/// let rules = vec![Triple::new(
///     Term::iri("http://example.org/Agent"),
///     SPINDLE_EXPRESSED_AS,
///     Term::iri("http://example.org/name"),
/// )];
/// let rulebase = Rulebase::from_triples(&rules);
/// assert!(rulebase.is_whitelisted(&Iri::new("http://example.org/name")));
/// assert_eq!(rulebase.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rulebase {
    whitelist: BTreeSet<Term>,
}

impl Rulebase {
    /// A rulebase holding only the fixed members.
    #[must_use]
    pub fn fixed() -> Self {
        let whitelist = [vocab::rdf_type(), vocab::owl_same_as()]
            .into_iter()
            .map(Term::Iri)
            .collect();
        Self { whitelist }
    }

    /// Builds a rulebase from rule triples. Triples with other predicates
    /// are ignored.
    #[must_use]
    pub fn from_triples<'a, I>(rules: I) -> Self
    where
        I: IntoIterator<Item = &'a Triple>,
    {
        let expressed_as = vocab::expressed_as();
        let mut rulebase = Self::fixed();
        for triple in rules {
            if triple.predicate == expressed_as {
                rulebase.whitelist.insert(triple.subject.clone());
                rulebase.whitelist.insert(triple.object.clone());
            }
        }
        rulebase
    }

    /// Builds a rulebase from the named graph of `store`.
    ///
    /// # Errors
    /// - `GraphNotFound`: If the rule graph is not in the store
    pub fn build(store: &dyn DatasetStore, rule_graph: &GraphName) -> Result<Self, StorageError> {
        let rules = store.triples(rule_graph, &TriplePattern::with_predicate(vocab::expressed_as()))?;
        Ok(Self::from_triples(&rules))
    }

    /// Returns true if triples with this predicate survive stripping.
    #[must_use]
    pub fn is_whitelisted(&self, predicate: &Iri) -> bool {
        self.whitelist.contains(&Term::Iri(predicate.clone()))
    }

    /// Returns true if the term is in the whitelist.
    #[must_use]
    pub fn contains(&self, term: &Term) -> bool {
        self.whitelist.contains(term)
    }

    /// Whitelist size, fixed members included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.whitelist.len()
    }

    /// Never true: the fixed members are always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.whitelist.is_empty()
    }

    /// Whitelisted terms in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Term> {
        self.whitelist.iter()
    }
}

impl Default for Rulebase {
    fn default() -> Self {
        Self::fixed()
    }
}
