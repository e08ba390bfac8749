//! Conversion from borrowed Rio terms to owned Spindle terms.

use rio_api::model::{
    GraphName as RioGraphName, Literal as RioLiteral, Quad as RioQuad, Subject, Term as RioTerm,
    Triple as RioTriple,
};
use rio_turtle::TurtleError;
use rio_xml::RdfXmlError;

use crate::storage::StorageError;
use crate::term::{GraphName, Iri, Literal, Term, Triple};

/// Failure raised from inside a Rio parse callback.
#[derive(Debug)]
pub(crate) enum ParseFailure {
    Syntax(String),
    Unsupported(&'static str),
    Store(StorageError),
}

impl From<TurtleError> for ParseFailure {
    fn from(e: TurtleError) -> Self {
        Self::Syntax(e.to_string())
    }
}

impl From<RdfXmlError> for ParseFailure {
    fn from(e: RdfXmlError) -> Self {
        Self::Syntax(e.to_string())
    }
}

impl From<StorageError> for ParseFailure {
    fn from(e: StorageError) -> Self {
        Self::Store(e)
    }
}

fn subject(s: &Subject<'_>) -> Result<Term, ParseFailure> {
    match s {
        Subject::NamedNode(n) => Ok(Term::iri(n.iri)),
        Subject::BlankNode(b) => Ok(Term::blank(b.id)),
        #[allow(unreachable_patterns)]
        _ => Err(ParseFailure::Unsupported("quoted triples")),
    }
}

fn literal(l: &RioLiteral<'_>) -> Literal {
    match l {
        RioLiteral::Simple { value } => Literal::simple(*value),
        RioLiteral::LanguageTaggedString { value, language } => Literal::lang(*value, *language),
        RioLiteral::Typed { value, datatype } => Literal::typed(*value, datatype.iri),
    }
}

fn object(o: &RioTerm<'_>) -> Result<Term, ParseFailure> {
    match o {
        RioTerm::NamedNode(n) => Ok(Term::iri(n.iri)),
        RioTerm::BlankNode(b) => Ok(Term::blank(b.id)),
        RioTerm::Literal(l) => Ok(Term::Literal(literal(l))),
        #[allow(unreachable_patterns)]
        _ => Err(ParseFailure::Unsupported("quoted triples")),
    }
}

pub(crate) fn triple(t: &RioTriple<'_>) -> Result<Triple, ParseFailure> {
    Ok(Triple::new(
        subject(&t.subject)?,
        Iri::new(t.predicate.iri),
        object(&t.object)?,
    ))
}

pub(crate) fn quad(q: &RioQuad<'_>) -> Result<(GraphName, Triple), ParseFailure> {
    let graph = match &q.graph_name {
        None => GraphName::default_graph(),
        Some(RioGraphName::NamedNode(n)) => GraphName::new(n.iri),
        Some(RioGraphName::BlankNode(b)) => GraphName::new(format!("_:{}", b.id)),
    };
    let triple = Triple::new(
        subject(&q.subject)?,
        Iri::new(q.predicate.iri),
        object(&q.object)?,
    );
    Ok((graph, triple))
}
