//! Request and response types for the classification pipeline

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Maximum number of texts accepted in a single request
pub const MAX_BATCH_TEXTS: usize = 100;

/// A classification request: an ordered, non-empty batch of texts.
///
/// Individual texts may be empty; the batch itself may not. The current
/// contract decodes a label for the first text only, even when several are
/// supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Texts to classify, 1..=100 entries
    pub texts: Vec<String>,
}

impl PredictionRequest {
    /// Create a request from a batch of texts
    pub fn new(texts: Vec<String>) -> Self {
        Self { texts }
    }

    /// Create a request for a single text
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            texts: vec![text.into()],
        }
    }

    /// Check the request-shape invariants: at least one text, at most
    /// [`MAX_BATCH_TEXTS`].
    pub fn validate(&self) -> Result<()> {
        if self.texts.is_empty() {
            return Err(Error::validation("texts must not be empty"));
        }
        if self.texts.len() > MAX_BATCH_TEXTS {
            return Err(Error::validation(format!(
                "too many texts: {} (max {})",
                self.texts.len(),
                MAX_BATCH_TEXTS
            )));
        }
        Ok(())
    }
}

/// The predicted label and its confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Predicted label for the first text in the batch
    pub prediction: String,

    /// Softmax probability mass of the selected class, in [0.0, 1.0]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl PredictionResponse {
    /// Create a response with a confidence score
    pub fn new(prediction: impl Into<String>, confidence: f32) -> Self {
        Self {
            prediction: prediction.into(),
            confidence: Some(confidence),
        }
    }
}
