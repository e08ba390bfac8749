//! Minimal structured queries over one graph.
//!
//! A [`Query`] is a conjunction of triple patterns with variables, an
//! optional `VALUES` clause binding one variable to a fixed set of terms, and
//! a projection. This is the only query surface the pipeline needs (the
//! license report); there is no text syntax, no filters, no optionals.
//!
//! # Ordering
//! Solutions are produced values-first, then in the store's triple order
//! for each pattern in turn, so results are deterministic.

use std::collections::BTreeMap;

use crate::storage::{DatasetStore, StorageError, TriplePattern};
use crate::term::{GraphName, Iri, Term, Triple};

/// One solution: variable name to bound term.
pub type Bindings = BTreeMap<String, Term>;

/// A position in a query pattern: a variable or a constant term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternTerm {
    /// A named variable (without the leading `?`).
    Var(String),
    /// A constant.
    Term(Term),
}

impl PatternTerm {
    /// A variable.
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    /// A constant IRI.
    #[must_use]
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Term(Term::iri(iri))
    }

    fn resolve(&self, bindings: &Bindings) -> Option<Term> {
        match self {
            Self::Var(name) => bindings.get(name).cloned(),
            Self::Term(t) => Some(t.clone()),
        }
    }
}

impl From<Term> for PatternTerm {
    fn from(t: Term) -> Self {
        Self::Term(t)
    }
}

/// A triple pattern with variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPattern {
    /// Subject position.
    pub subject: PatternTerm,
    /// Predicate position.
    pub predicate: PatternTerm,
    /// Object position.
    pub object: PatternTerm,
}

/// A `VALUES ?var { ... }` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuesClause {
    /// Bound variable.
    pub var: String,
    /// Allowed terms, in order.
    pub terms: Vec<Term>,
}

/// A conjunctive query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    projection: Vec<String>,
    patterns: Vec<QueryPattern>,
    values: Option<ValuesClause>,
}

impl Query {
    /// Starts a query projecting the given variables. An empty projection
    /// keeps every variable.
    #[must_use]
    pub fn select<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            projection: vars.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Adds a triple pattern.
    #[must_use]
    pub fn pattern(
        mut self,
        subject: impl Into<PatternTerm>,
        predicate: impl Into<PatternTerm>,
        object: impl Into<PatternTerm>,
    ) -> Self {
        self.patterns.push(QueryPattern {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        });
        self
    }

    /// Sets the `VALUES` clause.
    #[must_use]
    pub fn values(mut self, var: impl Into<String>, terms: Vec<Term>) -> Self {
        self.values = Some(ValuesClause {
            var: var.into(),
            terms,
        });
        self
    }

    /// Evaluates the query against one graph of `store`.
    pub fn evaluate(&self, store: &dyn DatasetStore, graph: &GraphName) -> Result<Vec<Bindings>, StorageError> {
        let mut solutions: Vec<Bindings> = match &self.values {
            Some(values) => values
                .terms
                .iter()
                .map(|t| Bindings::from([(values.var.clone(), t.clone())]))
                .collect(),
            None => vec![Bindings::new()],
        };

        for pattern in &self.patterns {
            let mut next = Vec::new();
            for solution in &solutions {
                extend(store, graph, pattern, solution, &mut next)?;
            }
            solutions = next;
            if solutions.is_empty() {
                break;
            }
        }

        if !self.projection.is_empty() {
            for solution in &mut solutions {
                solution.retain(|var, _| self.projection.contains(var));
            }
        }
        Ok(solutions)
    }
}

fn extend(
    store: &dyn DatasetStore,
    graph: &GraphName,
    pattern: &QueryPattern,
    solution: &Bindings,
    out: &mut Vec<Bindings>,
) -> Result<(), StorageError> {
    let predicate = match pattern.predicate.resolve(solution) {
        Some(Term::Iri(iri)) => Some(iri),
        // A predicate bound to a literal or blank node cannot match.
        Some(_) => return Ok(()),
        None => None,
    };
    let lookup = TriplePattern {
        subject: pattern.subject.resolve(solution),
        predicate,
        object: pattern.object.resolve(solution),
    };

    for triple in store.triples(graph, &lookup)? {
        if let Some(extended) = bind(pattern, &triple, solution) {
            out.push(extended);
        }
    }
    Ok(())
}

fn bind(pattern: &QueryPattern, triple: &Triple, solution: &Bindings) -> Option<Bindings> {
    let mut out = solution.clone();
    let positions = [
        (&pattern.subject, triple.subject.clone()),
        (&pattern.predicate, Term::Iri(Iri::clone(&triple.predicate))),
        (&pattern.object, triple.object.clone()),
    ];
    for (slot, value) in positions {
        let PatternTerm::Var(name) = slot else {
            continue;
        };
        match out.get(name) {
            Some(bound) if *bound != value => return None,
            Some(_) => {}
            None => {
                out.insert(name.clone(), value);
            }
        }
    }
    Some(out)
}
