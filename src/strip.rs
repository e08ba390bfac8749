//! Strip: remove triples whose predicate is not whitelisted.

use crate::observer::{PipelineEvent, PipelineObserver};
use crate::rulebase::Rulebase;
use crate::storage::{DatasetStore, StorageError, TriplePattern};

/// Removes every triple whose predicate is not in the rulebase whitelist.
///
/// Each graph's triples are snapshotted before anything is removed, so
/// removal never skips or repeats a triple. Removal is irreversible; if the
/// store fails part-way, graphs already visited stay stripped.
///
/// Returns the number of triples removed.
pub fn strip(
    store: &dyn DatasetStore,
    rulebase: &Rulebase,
    observer: &dyn PipelineObserver,
) -> Result<usize, StorageError> {
    observer.on_event(&PipelineEvent::StripStarted {
        triples: store.total_len()?,
    });

    let mut removed = 0;
    for graph in store.graph_names()? {
        let snapshot = store.triples(&graph, &TriplePattern::any())?;
        for triple in snapshot {
            if rulebase.is_whitelisted(&triple.predicate) {
                continue;
            }
            if store.remove(&graph, &triple)? {
                removed += 1;
                observer.on_event(&PipelineEvent::TripleStripped {
                    graph: graph.clone(),
                    triple,
                });
            }
        }
    }

    observer.on_event(&PipelineEvent::StripFinished {
        removed,
        remaining: store.total_len()?,
    });
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{NullObserver, RecordingObserver};
    use crate::storage::InMemoryDataset;
    use crate::term::{GraphName, Term, Triple};
    use crate::vocab::{OWL_SAME_AS, RDF_TYPE};

    fn dataset() -> InMemoryDataset {
        let g1 = GraphName::new("http://example.org/g1");
        let g2 = GraphName::new("http://example.org/g2");
        InMemoryDataset::from_quads(vec![
            (g1.clone(), Triple::new(Term::iri("ex:x"), "ex:unknownPred", Term::literal("lit"))),
            (g1.clone(), Triple::new(Term::iri("ex:x"), RDF_TYPE, Term::iri("ex:Thing"))),
            (g1, Triple::new(Term::iri("ex:x"), OWL_SAME_AS, Term::iri("ex:y"))),
            (g2, Triple::new(Term::iri("ex:y"), "ex:unknownPred", Term::iri("ex:z"))),
        ])
        .unwrap()
    }

    #[test]
    fn test_strip_removes_unknown_predicates() {
        let store = dataset();
        let before = store.total_len().unwrap();
        let removed = strip(&store, &Rulebase::fixed(), &NullObserver).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.total_len().unwrap(), before - 2);
        assert_eq!(store.graph_len(&GraphName::new("http://example.org/g2")).unwrap(), 0);
    }

    #[test]
    fn test_strip_is_idempotent() {
        let store = dataset();
        strip(&store, &Rulebase::fixed(), &NullObserver).unwrap();
        let once = crate::storage::fingerprint(&store).unwrap();
        assert_eq!(strip(&store, &Rulebase::fixed(), &NullObserver).unwrap(), 0);
        assert_eq!(once, crate::storage::fingerprint(&store).unwrap());
    }

    #[test]
    fn test_strip_reports_each_removal() {
        let store = dataset();
        let obs = RecordingObserver::new();
        strip(&store, &Rulebase::fixed(), &obs).unwrap();

        let events = obs.events();
        assert_eq!(events.first(), Some(&PipelineEvent::StripStarted { triples: 4 }));
        assert_eq!(
            events.last(),
            Some(&PipelineEvent::StripFinished {
                removed: 2,
                remaining: 2
            })
        );
        assert_eq!(
            obs.count(|e| matches!(e, PipelineEvent::TripleStripped { .. })),
            2
        );
    }

    #[test]
    fn test_strip_keeps_empty_graphs() {
        let store = dataset();
        strip(&store, &Rulebase::fixed(), &NullObserver).unwrap();
        assert_eq!(store.graph_names().unwrap().len(), 2);
    }
}
