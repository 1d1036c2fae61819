//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use textguard_inference::{ModelConfig, ModelSource};

/// Server configuration: listen address plus the model section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Classification model configuration
    #[serde(default)]
    pub model: ModelConfig,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides.
    pub fn load(cli: &crate::Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config: Self = if Path::new(&cli.config).exists() {
            let content = std::fs::read_to_string(&cli.config)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(model_dir) = &cli.model_dir {
            config.model.source = ModelSource::Local {
                path: PathBuf::from(model_dir),
            };
        }
        if let Some(label_map) = &cli.label_map {
            config.model.label_map_path = PathBuf::from(label_map);
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            model: ModelConfig::default(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}
