//! N-Quads output.

use std::io::Write;

use crate::error::SpindleResult;
use crate::storage::{DatasetStore, TriplePattern};

/// Writes every graph of `store` as N-Quads, in store order.
///
/// Triples of the default graph are written without a graph label, and
/// blank graph names (`_:id`) as blank nodes. Returns
/// the number of statements written.
pub fn write_nquads<W: Write>(store: &dyn DatasetStore, mut writer: W) -> SpindleResult<usize> {
    let mut written = 0;
    for graph in store.graph_names()? {
        for triple in store.triples(&graph, &TriplePattern::any())? {
            if graph.is_default() {
                writeln!(writer, "{triple}")?;
            } else {
                let label = if graph.as_str().starts_with("_:") {
                    graph.to_string()
                } else {
                    format!("<{graph}>")
                };
                writeln!(
                    writer,
                    "{} {} {} {label} .",
                    triple.subject, triple.predicate, triple.object
                )?;
            }
            written += 1;
        }
    }
    writer.flush()?;
    Ok(written)
}
