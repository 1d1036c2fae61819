//! Candle-based inference engine

use std::path::{Path, PathBuf};

use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};

use textguard_core::{Error, Result};

use crate::batch::TokenizedBatch;
use crate::config::ModelSource;

/// Per-text, per-class raw scores produced by one forward pass.
/// Ephemeral: decoded and discarded per request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    /// One row of `num_labels` logits per input text
    pub logits: Vec<Vec<f32>>,
}

impl ModelOutput {
    /// Number of rows (input texts).
    pub fn len(&self) -> usize {
        self.logits.len()
    }

    /// Whether the output has no rows.
    pub fn is_empty(&self) -> bool {
        self.logits.is_empty()
    }
}

/// The forward-pass seam of the pipeline.
///
/// The production implementation is [`InferenceEngine`]; tests substitute a
/// fixed-logit stand-in. The pass is pure compute: no I/O, no suspension,
/// deterministic for identical weights and inputs.
pub trait ForwardModel: Send + Sync {
    /// Run one forward pass over a tokenized batch, producing one row of
    /// per-class logits per input text.
    fn forward(&self, batch: &TokenizedBatch) -> Result<ModelOutput>;
}

/// Resolved locations of the three files a classification model needs.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    /// BERT architecture config (config.json)
    pub config: PathBuf,

    /// Tokenizer definition (tokenizer.json)
    pub tokenizer: PathBuf,

    /// Classification weights (model.safetensors or pytorch_model.bin)
    pub weights: PathBuf,
}

impl ModelFiles {
    /// Resolve model files from the configured source, downloading from
    /// HuggingFace Hub when required.
    pub fn resolve(source: &ModelSource) -> Result<Self> {
        match source {
            ModelSource::Local { path } => Self::resolve_local(path),
            ModelSource::HuggingFace { repo, revision } => Self::download(repo, revision),
        }
    }

    fn resolve_local(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            return Err(Error::resource(format!(
                "model directory does not exist: {}",
                dir.display()
            )));
        }

        let weights = if dir.join("model.safetensors").exists() {
            dir.join("model.safetensors")
        } else if dir.join("pytorch_model.bin").exists() {
            dir.join("pytorch_model.bin")
        } else {
            return Err(Error::resource(format!(
                "no model weights found in {}",
                dir.display()
            )));
        };

        Ok(Self {
            config: dir.join("config.json"),
            tokenizer: dir.join("tokenizer.json"),
            weights,
        })
    }

    fn download(repo: &str, revision: &str) -> Result<Self> {
        tracing::info!(repo, revision, "downloading model from HuggingFace Hub");

        let api = hf_hub::api::sync::Api::new()
            .map_err(|e| Error::resource(format!("failed to initialize HuggingFace API: {}", e)))?;

        let repo = api.repo(hf_hub::Repo::with_revision(
            repo.to_string(),
            hf_hub::RepoType::Model,
            revision.to_string(),
        ));

        let fetch = |file: &str| {
            repo.get(file)
                .map_err(|e| Error::resource(format!("failed to download {}: {}", file, e)))
        };

        Ok(Self {
            config: fetch("config.json")?,
            tokenizer: fetch("tokenizer.json")?,
            weights: fetch("model.safetensors")?,
        })
    }
}

/// BERT sequence-classification engine.
///
/// Owns the loaded model weights: the base encoder, the pooler over the CLS
/// token, and the classification head. Loaded once, read-only for the
/// remainder of the process lifetime. Candle runs inference-only: no
/// gradient state is tracked or retained across calls.
pub struct InferenceEngine {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
    device: Device,
    num_labels: usize,
}

impl InferenceEngine {
    /// Load model weights for `num_labels` output classes.
    pub fn from_files(files: &ModelFiles, num_labels: usize, device: &str) -> Result<Self> {
        let device = parse_device(device)?;

        let config_str = std::fs::read_to_string(&files.config).map_err(|e| {
            Error::resource(format!(
                "failed to read model config {}: {}",
                files.config.display(),
                e
            ))
        })?;
        let config: BertConfig = serde_json::from_str(&config_str).map_err(|e| {
            Error::resource(format!(
                "failed to parse model config {}: {}",
                files.config.display(),
                e
            ))
        })?;

        let use_pth = files.weights.extension().and_then(|s| s.to_str()) == Some("bin");
        let vb = if use_pth {
            VarBuilder::from_pth(&files.weights, DType::F32, &device)
                .map_err(|e| Error::resource(format!("failed to load weights: {}", e)))?
        } else {
            unsafe {
                VarBuilder::from_mmaped_safetensors(&[&files.weights], DType::F32, &device)
                    .map_err(|e| Error::resource(format!("failed to load weights: {}", e)))?
            }
        };

        let bert = BertModel::load(vb.pp("bert"), &config)
            .map_err(|e| Error::resource(format!("failed to load BERT encoder: {}", e)))?;
        let pooler = candle_nn::linear(
            config.hidden_size,
            config.hidden_size,
            vb.pp("bert").pp("pooler").pp("dense"),
        )
        .map_err(|e| Error::resource(format!("failed to load pooler: {}", e)))?;
        // An incompatible class count shows up here as a weight-shape mismatch.
        let classifier = candle_nn::linear(config.hidden_size, num_labels, vb.pp("classifier"))
            .map_err(|e| Error::resource(format!("failed to load classification head: {}", e)))?;

        tracing::info!(num_labels, "BERT classification model loaded");

        Ok(Self {
            bert,
            pooler,
            classifier,
            device,
            num_labels,
        })
    }

    /// Number of output classes this engine produces.
    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    fn batch_tensors(&self, batch: &TokenizedBatch) -> Result<(Tensor, Tensor)> {
        let rows = batch.len();
        let width = batch.seq_len();
        if rows == 0 || width == 0 {
            return Err(Error::inference("cannot run a forward pass on an empty batch"));
        }

        let mut ids = Vec::with_capacity(rows * width);
        let mut mask = Vec::with_capacity(rows * width);
        for (row_ids, row_mask) in batch.token_ids.iter().zip(&batch.attention_mask) {
            if row_ids.len() != width || row_mask.len() != width {
                return Err(Error::inference("ragged batch: rows differ in length"));
            }
            ids.extend_from_slice(row_ids);
            mask.extend_from_slice(row_mask);
        }

        let token_ids = Tensor::new(ids.as_slice(), &self.device)
            .and_then(|t| t.reshape(&[rows, width]))
            .map_err(|e| Error::inference(format!("failed to build input tensor: {}", e)))?;
        let attention_mask = Tensor::new(mask.as_slice(), &self.device)
            .and_then(|t| t.reshape(&[rows, width]))
            .map_err(|e| Error::inference(format!("failed to build mask tensor: {}", e)))?;

        Ok((token_ids, attention_mask))
    }
}

impl ForwardModel for InferenceEngine {
    fn forward(&self, batch: &TokenizedBatch) -> Result<ModelOutput> {
        let (token_ids, attention_mask) = self.batch_tensors(batch)?;
        let token_type_ids = token_ids
            .zeros_like()
            .map_err(|e| Error::inference(format!("failed to build segment tensor: {}", e)))?;

        let sequence_output = self
            .bert
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))
            .map_err(|e| Error::inference(format!("encoder forward pass failed: {}", e)))?;

        // Standard BERT sequence classification: CLS token -> pooler ->
        // tanh -> classification head.
        let logits = sequence_output
            .i((.., 0))
            .and_then(|cls| self.pooler.forward(&cls))
            .and_then(|pooled| pooled.tanh())
            .and_then(|pooled| self.classifier.forward(&pooled))
            .map_err(|e| Error::inference(format!("classification head failed: {}", e)))?;

        let logits = logits
            .to_vec2::<f32>()
            .map_err(|e| Error::inference(format!("failed to read logits: {}", e)))?;

        Ok(ModelOutput { logits })
    }
}

fn parse_device(device: &str) -> Result<Device> {
    match device {
        "cpu" => Ok(Device::Cpu),
        "cuda" => Device::new_cuda(0)
            .map_err(|e| Error::initialization(format!("failed to initialize CUDA: {}", e))),
        "metal" | "mps" => Device::new_metal(0)
            .map_err(|e| Error::initialization(format!("failed to initialize Metal: {}", e))),
        other => Err(Error::config(format!("unknown device: {:?}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_dir_is_resource_error() {
        let source = ModelSource::Local {
            path: PathBuf::from("/nonexistent/model-dir"),
        };
        assert!(matches!(
            ModelFiles::resolve(&source).unwrap_err(),
            Error::Resource(_)
        ));
    }

    #[test]
    fn test_dir_without_weights_is_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = ModelSource::Local {
            path: dir.path().to_path_buf(),
        };
        let err = ModelFiles::resolve(&source).unwrap_err();
        assert!(err.to_string().contains("no model weights"));
    }

    #[test]
    fn test_local_weight_file_preference() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pytorch_model.bin"), b"").unwrap();
        std::fs::write(dir.path().join("model.safetensors"), b"").unwrap();

        let files = ModelFiles::resolve(&ModelSource::Local {
            path: dir.path().to_path_buf(),
        })
        .unwrap();

        assert!(files.weights.ends_with("model.safetensors"));
    }

    #[test]
    fn test_cpu_device_always_parses() {
        assert!(parse_device("cpu").is_ok());
    }

    #[test]
    fn test_unknown_device_is_config_error() {
        assert!(matches!(
            parse_device("tpu").unwrap_err(),
            Error::Config(_)
        ));
    }
}
