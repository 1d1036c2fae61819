//! Model configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use textguard_core::{Error, Result};

/// Configuration for the classification model.
///
/// Built once at process startup and never mutated; the engine it configures
/// is the only owner for the remainder of the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier, used for logging only
    #[serde(default)]
    pub name: String,

    /// Where to load the model files from
    pub source: ModelSource,

    /// Number of output classes
    #[serde(default = "default_num_labels")]
    pub num_labels: usize,

    /// Maximum token sequence length
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Path to the label-map JSON resource
    pub label_map_path: PathBuf,

    /// Device to run inference on (cpu, cuda, metal)
    #[serde(default = "default_device")]
    pub device: String,
}

/// Model source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSource {
    /// Load from local filesystem (a directory holding config.json,
    /// tokenizer.json, and the weight file)
    Local { path: PathBuf },

    /// Download from HuggingFace Hub
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
    },
}

fn default_num_labels() -> usize {
    2
}

fn default_max_length() -> usize {
    512
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_revision() -> String {
    "main".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "textguard-bert".to_string(),
            source: ModelSource::Local {
                path: PathBuf::from("./models/textguard-bert"),
            },
            num_labels: default_num_labels(),
            max_length: default_max_length(),
            label_map_path: PathBuf::from("./models/textguard-bert/label_map.json"),
            device: default_device(),
        }
    }
}

impl ModelConfig {
    /// Check the configuration invariants: class count and token length must
    /// both be positive.
    pub fn validate(&self) -> Result<()> {
        if self.num_labels == 0 {
            return Err(Error::config("num_labels must be positive"));
        }
        if self.max_length == 0 {
            return Err(Error::config("max_length must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_source() {
        let json = r#"{
            "name": "topic-bert",
            "source": { "type": "local", "path": "./models/topic-bert" },
            "num_labels": 393,
            "max_length": 1024,
            "label_map_path": "./models/topic-bert/label_map.json"
        }"#;

        let config: ModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.num_labels, 393);
        assert_eq!(config.max_length, 1024);
        assert_eq!(config.device, "cpu");
        assert!(matches!(config.source, ModelSource::Local { .. }));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_huggingface_source_defaults_revision() {
        let json = r#"{
            "source": { "type": "huggingface", "repo": "unitary/toxic-bert" },
            "label_map_path": "./label_map.json"
        }"#;

        let config: ModelConfig = serde_json::from_str(json).unwrap();
        match &config.source {
            ModelSource::HuggingFace { repo, revision } => {
                assert_eq!(repo, "unitary/toxic-bert");
                assert_eq!(revision, "main");
            }
            _ => panic!("Expected huggingface source"),
        }
    }

    #[test]
    fn test_zero_label_count_rejected() {
        let config = ModelConfig {
            num_labels: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_max_length_rejected() {
        let config = ModelConfig {
            max_length: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
