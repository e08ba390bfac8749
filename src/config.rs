//! Pipeline configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! {
//!   "dataset": "data/sources.nq",
//!   "rulebase": "rulebase.ttl",
//!   "merge_strategy": "union_find",
//!   "generate": { "enabled": true }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::correlate::{IdStrategy, MergeStrategy};
use crate::error::{ConfigError, LoadError};
use crate::formats::Format;
use crate::generate::DEFAULT_PROXY_GRAPH;
use crate::term::GraphName;

/// Configuration of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Dataset document.
    pub dataset: Option<PathBuf>,
    /// Dataset format; guessed from the extension when unset.
    pub dataset_format: Option<Format>,
    /// Rulebase document.
    pub rulebase: Option<PathBuf>,
    /// Rulebase format; guessed from the extension when unset.
    pub rulebase_format: Option<Format>,
    /// Graph holding the rules. Defaults to the rulebase's source name,
    /// which is the graph a triples document loads into.
    pub rule_graph: Option<String>,
    /// How cross-cluster equivalences are handled.
    pub merge_strategy: MergeStrategy,
    /// How cluster identifiers are minted.
    pub id_strategy: IdStrategy,
    /// Generator settings.
    pub generate: GenerateConfig,
    /// Capacity of the event channel when events are streamed.
    pub observer_buffer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            dataset_format: None,
            rulebase: None,
            rulebase_format: None,
            rule_graph: None,
            merge_strategy: MergeStrategy::default(),
            id_strategy: IdStrategy::default(),
            generate: GenerateConfig::default(),
            observer_buffer: 1024,
        }
    }
}

impl PipelineConfig {
    /// Reads a JSON config file. The result is not yet validated.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parses a JSON config document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks that the config describes a runnable pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dataset.is_none() {
            return Err(invalid("dataset", "no dataset document given"));
        }
        if self.rulebase.is_none() {
            return Err(invalid("rulebase", "no rulebase document given"));
        }
        if self.observer_buffer == 0 {
            return Err(invalid("observer_buffer", "must be at least 1"));
        }
        if self.rule_graph.as_deref().is_some_and(|g| g.trim().is_empty()) {
            return Err(invalid("rule_graph", "must not be empty"));
        }
        if self.generate.proxy_graph.trim().is_empty() {
            return Err(invalid("generate.proxy_graph", "must not be empty"));
        }
        Ok(())
    }

    /// Dataset format, explicit or from the file extension.
    pub fn resolved_dataset_format(&self) -> Result<Option<Format>, LoadError> {
        resolve(self.dataset.as_deref(), self.dataset_format)
    }

    /// Rulebase format, explicit or from the file extension.
    pub fn resolved_rulebase_format(&self) -> Result<Option<Format>, LoadError> {
        resolve(self.rulebase.as_deref(), self.rulebase_format)
    }
}

fn resolve(
    path: Option<&Path>,
    explicit: Option<Format>,
) -> Result<Option<Format>, LoadError> {
    match (explicit, path) {
        (Some(format), _) => Ok(Some(format)),
        (None, Some(path)) => Format::from_path(path).map(Some),
        (None, None) => Ok(None),
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Generator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Run the proxy generator after correlation.
    pub enabled: bool,
    /// Graph the proxy triples are addressed to.
    pub proxy_graph: String,
    /// Insert the generated triples into the dataset.
    pub write_back: bool,
}

impl GenerateConfig {
    /// Target graph as a [`GraphName`].
    #[must_use]
    pub fn graph(&self) -> GraphName {
        GraphName::new(self.proxy_graph.clone())
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            proxy_graph: DEFAULT_PROXY_GRAPH.to_string(),
            write_back: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.merge_strategy, MergeStrategy::FirstProxy);
        assert_eq!(config.id_strategy, IdStrategy::Random);
        assert_eq!(config.observer_buffer, 1024);
        assert!(!config.generate.enabled);
        assert_eq!(config.generate.proxy_graph, DEFAULT_PROXY_GRAPH);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{
                "dataset": "data.nq",
                "rulebase": "rules.ttl",
                "merge_strategy": "union_find",
                "id_strategy": "sequential",
                "generate": { "enabled": true }
            }"#,
        )
        .unwrap();
        assert_eq!(config.dataset, Some(PathBuf::from("data.nq")));
        assert_eq!(config.merge_strategy, MergeStrategy::UnionFind);
        assert_eq!(config.id_strategy, IdStrategy::Sequential);
        assert!(config.generate.enabled);
        assert!(!config.generate.write_back);
        assert_eq!(config.generate.proxy_graph, DEFAULT_PROXY_GRAPH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_formats_resolve_from_extension() {
        let config = PipelineConfig::from_json_str(
            r#"{ "dataset": "data.trig", "rulebase": "rules.ttl", "rulebase_format": "ntriples" }"#,
        )
        .unwrap();
        assert_eq!(config.resolved_dataset_format().unwrap(), Some(Format::TriG));
        assert_eq!(config.resolved_rulebase_format().unwrap(), Some(Format::NTriples));
    }

    #[test]
    fn test_validate_rejects_missing_documents() {
        let err = PipelineConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "dataset"));
    }

    #[test]
    fn test_validate_rejects_zero_buffer() {
        let config = PipelineConfig {
            dataset: Some("d.nq".into()),
            rulebase: Some("r.ttl".into()),
            observer_buffer: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "observer_buffer"
        ));
    }

    #[test]
    fn test_parse_error() {
        let err = PipelineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "rule_graph": "urn:rules" }}"#).unwrap();
        let config = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.rule_graph.as_deref(), Some("urn:rules"));

        let missing = PipelineConfig::from_json_file(Path::new("/nonexistent/spindle.json"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
