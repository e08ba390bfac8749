//! # Spindle - Entity Correlation Engine
//!
//! Spindle ingests labeled-graph triples, filters them against a whitelist
//! of recognized relations, and groups entities declared equivalent by
//! `owl:sameAs` into canonical identity clusters.
//!
//! ## Core Concepts
//!
//! - **Rulebase**: the whitelist, built from `spindle:expressedAs` rules
//! - **Strip**: removes every triple whose predicate is not whitelisted
//! - **Correlate**: builds an [`EquivalenceIndex`] of clusters
//! - **Validate**: a lazy report of typed, licensed entities
//! - **Generate**: turns clusters into output triples
//!
//! Stages talk to data only through the [`DatasetStore`] trait and report
//! what they do to an injected [`PipelineObserver`].
//!
//! ## Usage
//!
//! ```rust
//! use spindle::correlate::{correlate, MergeStrategy, SequentialMinter};
//! use spindle::observer::NullObserver;
//! use spindle::vocab::OWL_SAME_AS;
//! use spindle::{DatasetStore, GraphName, InMemoryDataset, Rulebase, Term, Triple};
//!
//! let store = InMemoryDataset::new();
//! let g = GraphName::new("http://example.org/g1");
//! store.insert(&g, Triple::new(Term::iri("ex:a"), OWL_SAME_AS, Term::iri("ex:b")))?;
//! store.insert(&g, Triple::new(Term::iri("ex:b"), OWL_SAME_AS, Term::iri("ex:c")))?;
//! store.insert(&g, Triple::new(Term::iri("ex:a"), "ex:unknown", Term::literal("x")))?;
//!
//! let removed = spindle::strip(&store, &Rulebase::fixed(), &NullObserver)?;
//! assert_eq!(removed, 1);
//!
//! let index = correlate(&store, &mut SequentialMinter::new(), MergeStrategy::FirstProxy, &NullObserver)?;
//! assert_eq!(index.cluster_count(), 1);
//! assert_eq!(index.proxy_of(&Term::iri("ex:a")), index.proxy_of(&Term::iri("ex:c")));
//! # Ok::<(), spindle::StorageError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Data model and storage
pub mod error;
pub mod storage;
pub mod term;
pub mod vocab;

// Collaborators
pub mod formats;
pub mod query;

// Stages
pub mod correlate;
pub mod generate;
pub mod rulebase;
pub mod strip;
pub mod validate;

// Driving
pub mod config;
pub mod observer;
pub mod pipeline;

// Re-export primary types at crate root for convenience
pub use config::{GenerateConfig, PipelineConfig};
pub use correlate::{ClusterId, Correlator, EquivalenceIndex, IdStrategy, MergeStrategy};
pub use error::{ConfigError, LoadError, SpindleError, SpindleResult};
pub use formats::{load_dataset, load_from_reader, load_from_reader_with_base, Format, LoadSummary};
pub use generate::{GeneratedArtifact, Generator, ProxyGenerator};
pub use observer::{PipelineEvent, PipelineObserver};
pub use pipeline::{Pipeline, PipelineReport};
pub use rulebase::Rulebase;
pub use storage::{DatasetStore, InMemoryDataset, StorageError};
pub use strip::strip;
pub use term::{GraphName, Iri, Literal, Term, Triple};
pub use validate::{validate, LicenseRow};
