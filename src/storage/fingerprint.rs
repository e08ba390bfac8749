//! Stable content digests of a dataset.

use crate::storage::traits::{DatasetStore, StorageError, TriplePattern};

/// Blake3 digest over the sorted N-Quads rendering of every triple.
///
/// Two datasets with the same graphs and triples have the same fingerprint,
/// regardless of insertion order. Empty graphs contribute their name.
pub fn fingerprint(store: &dyn DatasetStore) -> Result<String, StorageError> {
    let mut lines = Vec::new();
    for graph in store.graph_names()? {
        lines.push(format!("# {graph}"));
        for triple in store.triples(&graph, &TriplePattern::any())? {
            lines.push(format!(
                "{} {} {} <{}> .",
                triple.subject, triple.predicate, triple.object, graph
            ));
        }
    }
    lines.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    Ok(hasher.finalize().to_hex().to_string())
}
