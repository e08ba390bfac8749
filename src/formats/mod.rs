//! Loading and dumping serialized graph documents.
//!
//! Two families of formats are supported:
//! - Quads formats (N-Quads, TriG) carry their own graph names
//! - Triples formats (N-Triples, Turtle, RDF/XML) load into one graph named
//!   after the document source, the way a "public ID" names a parsed document
//!
//! Relative IRIs resolve against the document's base: `file://` plus the
//! canonical path for files, the source name when it is itself an absolute
//! IRI, or an explicit base passed to [`load_from_reader_with_base`].
//!
//! Parsing is delegated to Rio.

mod convert;
mod nquads;

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use oxiri::Iri as BaseIri;
use rio_api::parser::{QuadsParser, TriplesParser};
use rio_turtle::{NQuadsParser, NTriplesParser, TriGParser, TurtleParser};
use rio_xml::RdfXmlParser;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::storage::DatasetStore;
use crate::term::{GraphName, Triple};

use convert::ParseFailure;

pub use nquads::write_nquads;

/// Serialization format of a graph document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// N-Quads (quads, one statement per line).
    NQuads,
    /// TriG (quads, Turtle syntax with graph blocks).
    TriG,
    /// N-Triples (triples, one statement per line).
    NTriples,
    /// Turtle (triples).
    Turtle,
    /// RDF/XML (triples).
    RdfXml,
}

impl Format {
    /// Parses a format name such as `nquads`, `nq`, `turtle`, `ttl` or `rdf`.
    pub fn from_name(name: &str) -> Result<Self, LoadError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "nquads" | "nq" | "n-quads" => Ok(Self::NQuads),
            "trig" => Ok(Self::TriG),
            "ntriples" | "nt" | "n-triples" => Ok(Self::NTriples),
            "turtle" | "ttl" => Ok(Self::Turtle),
            "rdfxml" | "rdf/xml" | "xml" | "rdf" => Ok(Self::RdfXml),
            _ => Err(LoadError::UnsupportedFormat {
                name: name.to_string(),
            }),
        }
    }

    /// Guesses the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_name(ext).map_err(|_| LoadError::UnsupportedFormat {
            name: path.display().to_string(),
        })
    }

    /// Returns true for formats that carry graph names.
    #[must_use]
    pub const fn is_quads(self) -> bool {
        matches!(self, Self::NQuads | Self::TriG)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NQuads => write!(f, "nquads"),
            Self::TriG => write!(f, "trig"),
            Self::NTriples => write!(f, "ntriples"),
            Self::Turtle => write!(f, "turtle"),
            Self::RdfXml => write!(f, "rdfxml"),
        }
    }
}

impl FromStr for Format {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// What a load added to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Source the document was read from.
    pub source: String,
    /// Graphs touched by the document, in first-seen order, with their
    /// triple counts after loading.
    pub graphs: Vec<(GraphName, usize)>,
    /// Total triples across the touched graphs.
    pub triples: usize,
}

/// Loads a document from disk into `store`.
///
/// The source name (used to name the graph of triples formats) is the path
/// as given.
pub fn load_dataset(path: &Path, format: Format, store: &dyn DatasetStore) -> Result<LoadSummary, LoadError> {
    let source_name = path.display().to_string();
    load_dataset_named(path, format, &source_name, store)
}

/// Loads a document from disk into `store`, naming it `source_name`.
///
/// Relative IRIs in the document resolve against the file's `file://` IRI.
pub fn load_dataset_named(
    path: &Path,
    format: Format,
    source_name: &str,
    store: &dyn DatasetStore,
) -> Result<LoadSummary, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let base = file_base_iri(path).or_else(|| BaseIri::parse(source_name.to_string()).ok());
    load(BufReader::new(file), format, source_name, base, store)
}

/// `file://` IRI of the canonical form of `path`, if it has one.
fn file_base_iri(path: &Path) -> Option<BaseIri<String>> {
    let absolute = std::fs::canonicalize(path).ok()?;
    let mut iri = String::from("file://");
    let text = absolute.to_string_lossy();
    if !text.starts_with('/') {
        iri.push('/');
    }
    for c in text.chars() {
        match c {
            '\\' => iri.push('/'),
            ' ' => iri.push_str("%20"),
            '%' => iri.push_str("%25"),
            c => iri.push(c),
        }
    }
    BaseIri::parse(iri).ok()
}

/// Loads a document from any buffered reader into `store`.
///
/// Statements are inserted in document order. Parsing stops at the first
/// syntax error; statements before it stay in the store, so callers that
/// need all-or-nothing behaviour should load into a fresh store.
///
/// Relative IRIs resolve against `source_name` when it is an absolute IRI;
/// otherwise they are a syntax error.
pub fn load_from_reader<R: BufRead>(
    reader: R,
    format: Format,
    source_name: &str,
    store: &dyn DatasetStore,
) -> Result<LoadSummary, LoadError> {
    let base = BaseIri::parse(source_name.to_string()).ok();
    load(reader, format, source_name, base, store)
}

/// Like [`load_from_reader`], resolving relative IRIs against `base_iri`.
pub fn load_from_reader_with_base<R: BufRead>(
    reader: R,
    format: Format,
    source_name: &str,
    base_iri: &str,
    store: &dyn DatasetStore,
) -> Result<LoadSummary, LoadError> {
    let base = BaseIri::parse(base_iri.to_string()).map_err(|e| LoadError::Syntax {
        source_name: source_name.to_string(),
        message: format!("invalid base IRI '{base_iri}': {e}"),
    })?;
    load(reader, format, source_name, Some(base), store)
}

fn load<R: BufRead>(
    reader: R,
    format: Format,
    source_name: &str,
    base: Option<BaseIri<String>>,
    store: &dyn DatasetStore,
) -> Result<LoadSummary, LoadError> {
    let mut touched: Vec<GraphName> = Vec::new();

    let result = {
        let mut sink = |graph: GraphName, triple: Triple| -> Result<(), ParseFailure> {
            if !touched.contains(&graph) {
                touched.push(graph.clone());
            }
            store.insert(&graph, triple)?;
            Ok(())
        };

        let own_graph = GraphName::new(source_name);

        match format {
            Format::NQuads => NQuadsParser::new(reader).parse_all(&mut |q| {
                let (graph, triple) = convert::quad(&q)?;
                sink(graph, triple)
            }),
            Format::TriG => TriGParser::new(reader, base).parse_all(&mut |q| {
                let (graph, triple) = convert::quad(&q)?;
                sink(graph, triple)
            }),
            Format::NTriples => {
                store.create_graph(&own_graph)?;
                NTriplesParser::new(reader)
                    .parse_all(&mut |t| sink(own_graph.clone(), convert::triple(&t)?))
            }
            Format::Turtle => {
                store.create_graph(&own_graph)?;
                TurtleParser::new(reader, base)
                    .parse_all(&mut |t| sink(own_graph.clone(), convert::triple(&t)?))
            }
            Format::RdfXml => {
                store.create_graph(&own_graph)?;
                RdfXmlParser::new(reader, base)
                    .parse_all(&mut |t| sink(own_graph.clone(), convert::triple(&t)?))
            }
        }
    };

    result.map_err(|failure| match failure {
        ParseFailure::Syntax(message) => LoadError::Syntax {
            source_name: source_name.to_string(),
            message,
        },
        ParseFailure::Unsupported(what) => LoadError::Syntax {
            source_name: source_name.to_string(),
            message: format!("{what} are not supported"),
        },
        ParseFailure::Store(e) => LoadError::Store(e),
    })?;

    if !format.is_quads() && touched.is_empty() {
        touched.push(GraphName::new(source_name));
    }

    let mut summary = LoadSummary {
        source: source_name.to_string(),
        ..LoadSummary::default()
    };
    for graph in touched {
        let len = store.graph_len(&graph)?;
        summary.triples += len;
        summary.graphs.push((graph, len));
    }
    Ok(summary)
}
