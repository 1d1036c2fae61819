//! Service facade composing the classification pipeline

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use textguard_core::{Error, PredictionError, PredictionRequest, PredictionResponse};

use crate::batch::BatchBuilder;
use crate::config::ModelConfig;
use crate::decoder::decode;
use crate::engine::{ForwardModel, InferenceEngine, ModelFiles};
use crate::label_map::LabelMap;

/// The fully-assembled pipeline: batch builder, forward model, label map.
/// All read-only after construction; shared across concurrent callers.
struct Pipeline {
    batcher: BatchBuilder,
    model: Arc<dyn ForwardModel>,
    labels: LabelMap,
}

/// Construction is initialization, so an uninitialized service has no
/// observable lifetime: every constructed service is already Ready or Failed.
enum ServiceState {
    Ready(Arc<Pipeline>),
    /// Initialization failed; terminal, never retried.
    Failed(String),
}

/// The classification service.
///
/// Owns the model lifecycle: resources are loaded exactly once at
/// construction and treated as read-only for the remainder of the process.
/// The state machine is `Ready` on successful construction or a terminal
/// `Failed`; a failed service rejects every `predict` call with a not-ready
/// error and is never re-initialized.
pub struct ClassifierService {
    state: ServiceState,
}

impl ClassifierService {
    /// Load the model, tokenizer, and label map described by `config`.
    ///
    /// A load failure is recorded as the terminal `Failed` state rather than
    /// panicking, so callers can observe the failure reason and refuse to
    /// serve.
    pub fn initialize(config: &ModelConfig) -> Self {
        match Self::build(config) {
            Ok(pipeline) => {
                info!(model = %config.name, num_labels = config.num_labels, "classifier ready");
                Self {
                    state: ServiceState::Ready(Arc::new(pipeline)),
                }
            }
            Err(cause) => {
                let err = Error::initialization(format!("model initialization failed: {}", cause));
                error!(error = %err, "classifier failed to initialize");
                Self {
                    state: ServiceState::Failed(err.to_string()),
                }
            }
        }
    }

    /// Assemble a ready service from pre-built components.
    pub fn from_parts(batcher: BatchBuilder, model: Arc<dyn ForwardModel>, labels: LabelMap) -> Self {
        Self {
            state: ServiceState::Ready(Arc::new(Pipeline {
                batcher,
                model,
                labels,
            })),
        }
    }

    fn build(config: &ModelConfig) -> textguard_core::Result<Pipeline> {
        config.validate()?;

        let files = ModelFiles::resolve(&config.source)?;
        let engine = InferenceEngine::from_files(&files, config.num_labels, &config.device)?;
        let batcher = BatchBuilder::from_file(&files.tokenizer, config.max_length)?;
        let labels = LabelMap::load(&config.label_map_path)?;

        Ok(Pipeline {
            batcher,
            model: Arc::new(engine),
            labels,
        })
    }

    /// Whether the service initialized successfully.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ServiceState::Ready(_))
    }

    /// The initialization failure reason, if any.
    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            ServiceState::Ready(_) => None,
            ServiceState::Failed(reason) => Some(reason),
        }
    }

    /// Classify a batch of texts, returning the label and confidence for the
    /// first text.
    ///
    /// Tokenization, the forward pass, and decoding are compute-bound and
    /// run on the blocking worker pool so in-flight async requests are not
    /// stalled for the duration of an inference. Any stage failure aborts
    /// the whole request; nothing is partially reported.
    pub async fn predict(
        &self,
        request: PredictionRequest,
    ) -> std::result::Result<PredictionResponse, PredictionError> {
        // Request-shape validation applies regardless of service state.
        request.validate()?;

        let pipeline = match &self.state {
            ServiceState::Ready(pipeline) => Arc::clone(pipeline),
            ServiceState::Failed(reason) => {
                return Err(Error::not_ready(reason.clone()).into());
            }
        };

        let started = Instant::now();
        let texts = request.texts;

        let result = tokio::task::spawn_blocking(move || {
            let batch = pipeline.batcher.encode(&texts, None)?;
            let output = pipeline.model.forward(&batch)?;
            decode(&output, &pipeline.labels)
        })
        .await
        .map_err(|e| {
            PredictionError::from(Error::inference(format!("inference worker failed: {}", e)))
        })?;

        let latency_us = started.elapsed().as_micros() as u64;
        match result {
            Ok(response) => {
                info!(
                    prediction = %response.prediction,
                    confidence = response.confidence,
                    latency_us,
                    "prediction complete"
                );
                Ok(response)
            }
            Err(cause) => {
                error!(error = %cause, latency_us, "prediction failed");
                Err(cause.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelSource;
    use std::path::PathBuf;

    fn failed_service() -> ClassifierService {
        let config = ModelConfig {
            source: ModelSource::Local {
                path: PathBuf::from("/nonexistent/model-dir"),
            },
            ..Default::default()
        };
        ClassifierService::initialize(&config)
    }

    #[test]
    fn test_initialize_with_missing_model_is_failed() {
        let service = failed_service();
        assert!(!service.is_ready());
        assert!(service.failure().unwrap().contains("initialization failed"));
    }

    #[tokio::test]
    async fn test_predict_on_failed_service_is_not_ready() {
        let service = failed_service();
        let err = service
            .predict(PredictionRequest::single("some text"))
            .await
            .unwrap_err();
        assert!(matches!(err.cause(), Error::NotReady(_)));
    }

    #[tokio::test]
    async fn test_empty_request_rejected_before_readiness_check() {
        // Validation applies even when the service never became ready.
        let service = failed_service();
        let err = service
            .predict(PredictionRequest::new(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err.cause(), Error::Validation(_)));
    }

    #[test]
    fn test_invalid_config_is_failed() {
        let config = ModelConfig {
            num_labels: 0,
            ..Default::default()
        };
        let service = ClassifierService::initialize(&config);
        assert!(!service.is_ready());
    }
}
