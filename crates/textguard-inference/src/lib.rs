//! TextGuard Inference
//!
//! Single-label text classification over a fixed label taxonomy.
//!
//! The pipeline runs in four stages, composed by [`ClassifierService`]:
//! batch building (sub-word tokenization, truncation, padding), the Candle
//! BERT forward pass, logit decoding (argmax + softmax confidence), and
//! label-map lookup. The model is loaded once per process and shared
//! read-only across callers; the compute-bound stages run on the blocking
//! worker pool so they never stall the async scheduler.

pub mod batch;
pub mod config;
pub mod decoder;
pub mod engine;
pub mod label_map;
pub mod service;

pub use batch::{BatchBuilder, TokenizedBatch};
pub use config::{ModelConfig, ModelSource};
pub use decoder::decode;
pub use engine::{ForwardModel, InferenceEngine, ModelFiles, ModelOutput};
pub use label_map::LabelMap;
pub use service::ClassifierService;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::batch::{BatchBuilder, TokenizedBatch};
    pub use crate::config::{ModelConfig, ModelSource};
    pub use crate::engine::{ForwardModel, InferenceEngine, ModelOutput};
    pub use crate::label_map::LabelMap;
    pub use crate::service::ClassifierService;
    pub use textguard_core::{PredictionRequest, PredictionResponse};
}
