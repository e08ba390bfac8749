//! Validate: report entities that carry both a type and a license.
//!
//! This is a read-only reporting pass. A graph without license triples
//! simply yields no rows.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::query::{Bindings, PatternTerm, Query};
use crate::storage::{DatasetStore, StorageError};
use crate::term::{GraphName, Term};
use crate::vocab;

/// One reported `(entity, type, license)` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRow {
    /// Graph the row was found in.
    pub graph: GraphName,
    /// The typed, licensed entity.
    pub entity: Term,
    /// Its `rdf:type`.
    pub entity_type: Term,
    /// Its license.
    pub license: Term,
}

fn license_query() -> Query {
    Query::select(["x", "type", "license"])
        .pattern(
            PatternTerm::var("x"),
            PatternTerm::iri(vocab::RDF_TYPE),
            PatternTerm::var("type"),
        )
        .pattern(
            PatternTerm::var("x"),
            PatternTerm::var("licensetype"),
            PatternTerm::var("license"),
        )
        .values(
            "licensetype",
            vocab::LICENSE_PREDICATES.iter().map(|p| Term::iri(*p)).collect(),
        )
}

/// Starts a license report over every graph of `store`.
///
/// The report is lazy: each graph is queried when iteration reaches it, and
/// nothing is cached between calls. Call again to re-run.
#[must_use]
pub fn validate(store: &dyn DatasetStore) -> LicenseReport<'_> {
    LicenseReport {
        store,
        query: license_query(),
        graphs: None,
        pending: VecDeque::new(),
        failed: false,
    }
}

/// Lazy iterator over license rows, graph by graph in store order.
///
/// A store failure is yielded once as an `Err` and ends the iteration.
pub struct LicenseReport<'a> {
    store: &'a dyn DatasetStore,
    query: Query,
    graphs: Option<VecDeque<GraphName>>,
    pending: VecDeque<LicenseRow>,
    failed: bool,
}

impl LicenseReport<'_> {
    fn row(graph: &GraphName, mut bindings: Bindings) -> Option<LicenseRow> {
        Some(LicenseRow {
            graph: graph.clone(),
            entity: bindings.remove("x")?,
            entity_type: bindings.remove("type")?,
            license: bindings.remove("license")?,
        })
    }

    fn fill(&mut self) -> Result<bool, StorageError> {
        if self.graphs.is_none() {
            self.graphs = Some(self.store.graph_names()?.into());
        }
        let Some(graphs) = self.graphs.as_mut() else {
            return Ok(false);
        };
        while self.pending.is_empty() {
            let Some(graph) = graphs.pop_front() else {
                return Ok(false);
            };
            for bindings in self.query.evaluate(self.store, &graph)? {
                if let Some(row) = Self::row(&graph, bindings) {
                    self.pending.push_back(row);
                }
            }
        }
        Ok(true)
    }
}

impl Iterator for LicenseReport<'_> {
    type Item = Result<LicenseRow, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.fill() {
            Ok(true) => self.pending.pop_front().map(Ok),
            Ok(false) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryDataset;
    use crate::term::Triple;
    use crate::vocab::{DCT_LICENSE, DOAP_LICENSE, RDF_TYPE};

    #[test]
    fn test_reports_typed_licensed_entity() {
        let g = GraphName::new("http://example.org/g1");
        let store = InMemoryDataset::from_quads(vec![
            (g.clone(), Triple::new(Term::iri("ex:work"), RDF_TYPE, Term::iri("ex:Book"))),
            (g.clone(), Triple::new(Term::iri("ex:work"), DCT_LICENSE, Term::iri("ex:CC-BY"))),
        ])
        .unwrap();

        let rows: Vec<LicenseRow> = validate(&store).collect::<Result<_, _>>().unwrap();
        assert_eq!(
            rows,
            vec![LicenseRow {
                graph: g,
                entity: Term::iri("ex:work"),
                entity_type: Term::iri("ex:Book"),
                license: Term::iri("ex:CC-BY"),
            }]
        );
    }

    #[test]
    fn test_untyped_or_unlicensed_entities_are_skipped() {
        let g = GraphName::new("g");
        let store = InMemoryDataset::from_quads(vec![
            (g.clone(), Triple::new(Term::iri("a"), RDF_TYPE, Term::iri("T"))),
            (g.clone(), Triple::new(Term::iri("b"), DOAP_LICENSE, Term::iri("MIT"))),
            (g, Triple::new(Term::iri("c"), "http://example.org/license", Term::iri("MIT"))),
        ])
        .unwrap();
        assert_eq!(validate(&store).count(), 0);
    }

    #[test]
    fn test_rows_do_not_cross_graphs() {
        let store = InMemoryDataset::from_quads(vec![
            (GraphName::new("g1"), Triple::new(Term::iri("a"), RDF_TYPE, Term::iri("T"))),
            (GraphName::new("g2"), Triple::new(Term::iri("a"), DCT_LICENSE, Term::iri("L"))),
        ])
        .unwrap();
        assert_eq!(validate(&store).count(), 0);
    }

    #[test]
    fn test_report_is_restartable() {
        let g = GraphName::new("g");
        let store = InMemoryDataset::from_quads(vec![
            (g.clone(), Triple::new(Term::iri("a"), RDF_TYPE, Term::iri("T"))),
            (g.clone(), Triple::new(Term::iri("a"), DCT_LICENSE, Term::iri("L"))),
        ])
        .unwrap();
        assert_eq!(validate(&store).count(), 1);
        store
            .insert(&g, Triple::new(Term::iri("a"), DOAP_LICENSE, Term::iri("M")))
            .unwrap();
        assert_eq!(validate(&store).count(), 2);
    }

    #[test]
    fn test_empty_store_yields_nothing() {
        let store = InMemoryDataset::new();
        assert!(validate(&store).next().is_none());
    }
}
