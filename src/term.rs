//! RDF terms, triples, and graph names.
//!
//! Terms are owned values with structural equality. Ordering is total so that
//! collections of terms can be iterated deterministically.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An absolute IRI, stored without surrounding angle brackets.
///
/// # Examples
///
/// ```
/// use spindle::Iri;
///
/// let iri = Iri::new("http://example.org/a");
/// assert_eq!(iri.as_str(), "http://example.org/a");
/// assert_eq!(iri.to_string(), "<http://example.org/a>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    /// Creates an IRI from its string form.
    #[must_use]
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    /// Returns the IRI text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl From<&str> for Iri {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Iri {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A literal value with an optional language tag or datatype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    /// Lexical form.
    pub value: String,
    /// Language tag, lower-cased (`en`, `en-gb`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Datatype IRI. `None` means `xsd:string`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<Iri>,
}

impl Literal {
    /// A plain string literal.
    #[must_use]
    pub fn simple(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    /// A language-tagged literal.
    #[must_use]
    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: Some(language.into().to_ascii_lowercase()),
            datatype: None,
        }
    }

    /// A typed literal.
    #[must_use]
    pub fn typed(value: impl Into<String>, datatype: impl Into<Iri>) -> Self {
        Self {
            value: value.into(),
            language: None,
            datatype: Some(datatype.into()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for c in self.value.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                c => write!(f, "{c}")?,
            }
        }
        f.write_str("\"")?;
        if let Some(lang) = &self.language {
            write!(f, "@{lang}")
        } else if let Some(dt) = &self.datatype {
            write!(f, "^^{dt}")
        } else {
            Ok(())
        }
    }
}

/// Any RDF term that can appear in a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Term {
    /// A named node.
    Iri(Iri),
    /// A blank node, identified by its document-local label.
    BlankNode(String),
    /// A literal.
    Literal(Literal),
}

impl Term {
    /// Shorthand for `Term::Iri(Iri::new(iri))`.
    #[must_use]
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(Iri::new(iri))
    }

    /// Shorthand for a simple string literal.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(Literal::simple(value))
    }

    /// Shorthand for a blank node.
    #[must_use]
    pub fn blank(label: impl Into<String>) -> Self {
        Self::BlankNode(label.into())
    }

    /// Returns the IRI if this term is a named node.
    #[must_use]
    pub const fn as_iri(&self) -> Option<&Iri> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Returns true for literals.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "{iri}"),
            Self::BlankNode(label) => write!(f, "_:{label}"),
            Self::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Self::Iri(iri)
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Self::Literal(lit)
    }
}

/// A (subject, predicate, object) statement.
///
/// Identity is value equality of the three components.
///
/// # Examples
///
/// ```
/// use spindle::{Iri, Term, Triple};
///
/// let t = Triple::new(
///     Term::iri("http://example.org/a"),
///     Iri::new("http://www.w3.org/2002/07/owl#sameAs"),
///     Term::iri("http://example.org/b"),
/// );
/// assert_eq!(
///     t.to_string(),
///     "<http://example.org/a> <http://www.w3.org/2002/07/owl#sameAs> <http://example.org/b> ."
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    /// Subject (IRI or blank node; literals are tolerated).
    pub subject: Term,
    /// Predicate IRI.
    pub predicate: Iri,
    /// Object term.
    pub object: Term,
}

impl Triple {
    /// Creates a new triple.
    #[must_use]
    pub fn new(subject: impl Into<Term>, predicate: impl Into<Iri>, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// Name of a graph within a dataset.
///
/// Graph names are usually IRIs, but documents loaded without graph
/// information are named after their source (for example `rulebase.ttl`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphName(String);

/// Name given to the default graph of a quads document.
pub const DEFAULT_GRAPH: &str = "urn:x-spindle:default";

impl GraphName {
    /// Creates a graph name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name used for a quads document's default graph.
    #[must_use]
    pub fn default_graph() -> Self {
        Self(DEFAULT_GRAPH.to_string())
    }

    /// Returns the name text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the default graph.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_GRAPH
    }
}

impl fmt::Display for GraphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GraphName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for GraphName {
    fn from(s: String) -> Self {
        Self(s)
    }
}
