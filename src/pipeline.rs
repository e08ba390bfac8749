//! The end-to-end pipeline.
//!
//! Stages run in a fixed order on one thread:
//!
//! 1. build the rulebase from the rule graph
//! 2. validate (read-only license report)
//! 3. strip non-whitelisted triples
//! 4. correlate `owl:sameAs` into an [`EquivalenceIndex`]
//! 5. generate, when enabled
//!
//! Loading happens before all of them: a document that cannot be read or
//! parsed aborts the run before the dataset is touched. A store failure
//! inside a stage aborts the run; earlier stages' changes are not rolled
//! back.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::correlate::{ClusterSummary, Correlator, EquivalenceIndex};
use crate::error::{ConfigError, LoadError, SpindleError, SpindleResult};
use crate::formats::{self, LoadSummary};
use crate::generate::{GeneratedArtifact, Generator, ProxyGenerator};
use crate::observer::{ChannelObserver, EventStream, PipelineEvent, PipelineObserver};
use crate::rulebase::Rulebase;
use crate::storage::{fingerprint, DatasetStore, InMemoryDataset, StorageError};
use crate::strip::strip;
use crate::term::GraphName;
use crate::validate::{validate, LicenseRow};

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Rows reported by the validator, before stripping.
    pub license_rows: Vec<LicenseRow>,
    /// Triples removed by strip.
    pub removed: usize,
    /// Triples left after strip.
    pub remaining: usize,
    /// Correlation result.
    pub index: EquivalenceIndex,
    /// Generator output, when generation is enabled.
    pub artifact: Option<GeneratedArtifact>,
    /// Dataset digest before any stage ran.
    pub fingerprint_before: String,
    /// Dataset digest after the last stage.
    pub fingerprint_after: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl PipelineReport {
    /// Serializable view of the report.
    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            license_rows: self.license_rows.clone(),
            removed: self.removed,
            remaining: self.remaining,
            clusters: self.index.summaries(),
            entities: self.index.entity_count(),
            generated: self.artifact.as_ref().map_or(0, GeneratedArtifact::len),
            fingerprint_before: self.fingerprint_before.clone(),
            fingerprint_after: self.fingerprint_after.clone(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }
}

/// JSON-friendly digest of a [`PipelineReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    /// Validator rows.
    pub license_rows: Vec<LicenseRow>,
    /// Triples removed by strip.
    pub removed: usize,
    /// Triples left after strip.
    pub remaining: usize,
    /// Clusters in mint order.
    pub clusters: Vec<ClusterSummary>,
    /// Entities with a proxy.
    pub entities: usize,
    /// Generated triples.
    pub generated: usize,
    /// Dataset digest before the run.
    pub fingerprint_before: String,
    /// Dataset digest after the run.
    pub fingerprint_after: String,
    /// Start time.
    pub started_at: DateTime<Utc>,
    /// End time.
    pub finished_at: DateTime<Utc>,
}

/// Dataset and rule documents loaded from a config.
#[derive(Debug)]
pub struct LoadedDocuments {
    /// The dataset.
    pub dataset: InMemoryDataset,
    /// The rule document.
    pub rules: InMemoryDataset,
    /// Graph of `rules` holding the rule triples.
    pub rule_graph: GraphName,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::Invalid {
        field: field.to_string(),
        reason: format!("no {field} document given"),
    })
}

/// Runs the stages with one configuration and one observer.
pub struct Pipeline {
    config: PipelineConfig,
    observer: Arc<dyn PipelineObserver>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(config: PipelineConfig, observer: Arc<dyn PipelineObserver>) -> Self {
        Self { config, observer }
    }

    /// Creates a pipeline that streams its events over a channel sized by
    /// `config.observer_buffer`.
    #[must_use]
    pub fn with_event_stream(config: PipelineConfig) -> (Self, EventStream) {
        let (observer, stream) = ChannelObserver::new(config.observer_buffer);
        (Self::new(config, Arc::new(observer)), stream)
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validates the config and loads both documents.
    pub fn load(&self) -> SpindleResult<LoadedDocuments> {
        self.config.validate()?;

        let dataset_path = required(self.config.dataset.as_deref(), "dataset")?;
        let rules_path = required(self.config.rulebase.as_deref(), "rulebase")?;
        let dataset_format = required(self.config.resolved_dataset_format()?, "dataset")?;
        let rules_format = required(self.config.resolved_rulebase_format()?, "rulebase")?;

        let rules = InMemoryDataset::new();
        let summary = formats::load_dataset(rules_path, rules_format, &rules)?;
        let rule_graph = self.rule_graph(&summary);
        self.observer.on_event(&PipelineEvent::DatasetLoaded { summary });

        let dataset = InMemoryDataset::new();
        let summary = formats::load_dataset(dataset_path, dataset_format, &dataset)?;
        self.observer.on_event(&PipelineEvent::DatasetLoaded { summary });

        Ok(LoadedDocuments {
            dataset,
            rules,
            rule_graph,
        })
    }

    fn rule_graph(&self, summary: &LoadSummary) -> GraphName {
        match &self.config.rule_graph {
            Some(name) => GraphName::new(name.clone()),
            None => GraphName::new(summary.source.clone()),
        }
    }

    /// Loads the configured documents and runs every stage.
    ///
    /// Returns the processed dataset together with the report.
    pub fn run_from_config(&self) -> SpindleResult<(InMemoryDataset, PipelineReport)> {
        let docs = self.load()?;
        let report = self.run(&docs.dataset, &docs.rules, &docs.rule_graph)?;
        Ok((docs.dataset, report))
    }

    /// Runs every stage over already-loaded stores.
    ///
    /// `rule_store` is only read; `dataset` is stripped in place and, with
    /// `generate.write_back`, receives the generated triples.
    pub fn run(
        &self,
        dataset: &dyn DatasetStore,
        rule_store: &dyn DatasetStore,
        rule_graph: &GraphName,
    ) -> SpindleResult<PipelineReport> {
        let started_at = Utc::now();
        let observer = self.observer.as_ref();

        let rulebase = Rulebase::build(rule_store, rule_graph).map_err(|e| match e {
            StorageError::GraphNotFound(graph) => {
                SpindleError::from(LoadError::RuleGraphNotFound { graph })
            }
            other => SpindleError::from(other),
        })?;
        observer.on_event(&PipelineEvent::RulebaseBuilt {
            graph: rule_graph.clone(),
            whitelisted: rulebase.len(),
        });

        let fingerprint_before = fingerprint(dataset)?;

        let mut license_rows = Vec::new();
        for row in validate(dataset) {
            let row = row?;
            observer.on_event(&PipelineEvent::LicenseFound { row: row.clone() });
            license_rows.push(row);
        }
        observer.on_event(&PipelineEvent::ValidateFinished {
            rows: license_rows.len(),
        });

        let removed = strip(dataset, &rulebase, observer)?;
        let remaining = dataset.total_len()?;

        let correlator = Correlator::new(self.config.merge_strategy, self.config.id_strategy);
        let index = correlator.run(dataset, observer)?;

        let artifact = if self.config.generate.enabled {
            let artifact = ProxyGenerator::new(self.config.generate.graph()).generate(&index);
            if self.config.generate.write_back {
                artifact.write_into(dataset)?;
            }
            observer.on_event(&PipelineEvent::GenerateFinished {
                graph: artifact.graph.clone(),
                triples: artifact.len(),
            });
            Some(artifact)
        } else {
            None
        };

        let fingerprint_after = fingerprint(dataset)?;

        Ok(PipelineReport {
            license_rows,
            removed,
            remaining,
            index,
            artifact,
            fingerprint_before,
            fingerprint_after,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlate::{IdStrategy, MergeStrategy};
    use crate::observer::{NullObserver, RecordingObserver};
    use crate::term::{Term, Triple};
    use crate::vocab::{DCT_LICENSE, OWL_SAME_AS, RDF_TYPE, SPINDLE_EXPRESSED_AS};

    fn rules() -> (InMemoryDataset, GraphName) {
        let g = GraphName::new("rulebase.ttl");
        let store = InMemoryDataset::from_quads(vec![(
            g.clone(),
            Triple::new(Term::iri("ex:Work"), SPINDLE_EXPRESSED_AS, Term::iri(DCT_LICENSE)),
        )])
        .unwrap();
        (store, g)
    }

    fn dataset() -> InMemoryDataset {
        let g = GraphName::new("urn:g1");
        InMemoryDataset::from_quads(vec![
            (g.clone(), Triple::new(Term::iri("ex:work"), RDF_TYPE, Term::iri("ex:Book"))),
            (g.clone(), Triple::new(Term::iri("ex:work"), DCT_LICENSE, Term::iri("ex:CC-BY"))),
            (g.clone(), Triple::new(Term::iri("ex:work"), "ex:unknownPred", Term::literal("x"))),
            (g.clone(), Triple::new(Term::iri("ex:work"), OWL_SAME_AS, Term::iri("ex:w2"))),
            (g, Triple::new(Term::iri("ex:w2"), OWL_SAME_AS, Term::iri("ex:w3"))),
        ])
        .unwrap()
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            id_strategy: IdStrategy::Sequential,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_run_all_stages() {
        let (rule_store, rule_graph) = rules();
        let data = dataset();
        let obs = Arc::new(RecordingObserver::new());
        let pipeline = Pipeline::new(config(), obs.clone());

        let report = pipeline.run(&data, &rule_store, &rule_graph).unwrap();

        assert_eq!(report.license_rows.len(), 1);
        assert_eq!(report.removed, 1);
        assert_eq!(report.remaining, 4);
        assert_eq!(report.index.cluster_count(), 1);
        assert!(report.artifact.is_none());
        assert_ne!(report.fingerprint_before, report.fingerprint_after);
        assert!(report.started_at <= report.finished_at);

        let events = obs.events();
        assert!(matches!(events[0], PipelineEvent::RulebaseBuilt { whitelisted: 4, .. }));
        assert_eq!(obs.count(|e| matches!(e, PipelineEvent::LicenseFound { .. })), 1);
        assert!(matches!(events.last(), Some(PipelineEvent::CorrelateFinished { .. })));
    }

    #[test]
    fn test_generate_with_write_back() {
        let (rule_store, rule_graph) = rules();
        let data = dataset();
        let mut config = config();
        config.generate.enabled = true;
        config.generate.write_back = true;
        let pipeline = Pipeline::new(config, Arc::new(NullObserver));

        let report = pipeline.run(&data, &rule_store, &rule_graph).unwrap();
        let artifact = report.artifact.unwrap();
        assert_eq!(artifact.len(), 3);
        assert_eq!(data.graph_len(&artifact.graph).unwrap(), 3);
    }

    #[test]
    fn test_missing_rule_graph_is_load_error() {
        let (rule_store, _) = rules();
        let data = dataset();
        let before = fingerprint(&data).unwrap();
        let obs = Arc::new(RecordingObserver::new());
        let pipeline = Pipeline::new(config(), obs.clone());
        let err = pipeline
            .run(&data, &rule_store, &GraphName::new("urn:nope"))
            .unwrap_err();
        assert!(err.is_load());
        assert!(err.is_fatal_before_stages());
        assert!(matches!(
            err,
            SpindleError::Load(LoadError::RuleGraphNotFound { ref graph }) if graph.as_str() == "urn:nope"
        ));
        assert!(obs.events().is_empty());
        assert_eq!(fingerprint(&data).unwrap(), before);
    }

    #[test]
    fn test_load_requires_documents() {
        let pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(NullObserver));
        let err = pipeline.run_from_config().unwrap_err();
        assert!(err.is_config());
        assert!(err.is_fatal_before_stages());
    }

    #[test]
    fn test_load_reports_the_document_whose_format_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("data.nq");
        let rules = dir.path().join("rules.json");
        std::fs::write(&dataset, "").unwrap();
        std::fs::write(&rules, "").unwrap();
        let config = PipelineConfig {
            dataset: Some(dataset),
            rulebase: Some(rules.clone()),
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(config, Arc::new(NullObserver));
        let err = pipeline.load().unwrap_err();
        assert!(err.is_fatal_before_stages());
        assert!(matches!(
            err,
            SpindleError::Load(LoadError::UnsupportedFormat { ref name }) if *name == rules.display().to_string()
        ));
    }

    #[test]
    fn test_event_stream_pipeline() {
        let (rule_store, rule_graph) = rules();
        let mut config = config();
        config.merge_strategy = MergeStrategy::UnionFind;
        let (pipeline, stream) = Pipeline::with_event_stream(config);
        pipeline.run(&dataset(), &rule_store, &rule_graph).unwrap();
        let events = stream.drain();
        assert!(!events.is_empty());
        assert_eq!(stream.dropped(), 0);
    }

    #[test]
    fn test_summary_serializes() {
        let (rule_store, rule_graph) = rules();
        let pipeline = Pipeline::new(config(), Arc::new(NullObserver));
        let report = pipeline.run(&dataset(), &rule_store, &rule_graph).unwrap();
        let json = serde_json::to_value(report.summary()).unwrap();
        assert_eq!(json["removed"], 1);
        assert_eq!(json["clusters"].as_array().map(Vec::len), Some(1));
    }
}
