//! Error types for TextGuard

/// Result type alias using TextGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for TextGuard operations.
///
/// Every pipeline stage reports its own variant so the failure kind
/// survives to the top of the stack for logging and HTTP mapping.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad caller input (empty or oversized request)
    #[error("invalid request: {0}")]
    Validation(String),

    /// The service was called before (or after) a successful initialization
    #[error("classifier not ready: {0}")]
    NotReady(String),

    /// Model, tokenizer, or label-map load failure. Fatal to the service.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// Text could not be converted into token ids
    #[error("tokenization failed: {0}")]
    Tokenization(String),

    /// Forward-pass execution failure
    #[error("inference failed: {0}")]
    Inference(String),

    /// The decoded class index has no entry in the label map
    #[error("no label for class index {0}")]
    LabelLookup(usize),

    /// Missing or malformed side-car resource (label map, model files)
    #[error("resource error: {0}")]
    Resource(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new not-ready error
    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    /// Create a new initialization error
    pub fn initialization(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Create a new tokenization error
    pub fn tokenization(msg: impl Into<String>) -> Self {
        Self::Tokenization(msg.into())
    }

    /// Create a new inference error
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new resource error
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Failure signal returned by the service facade.
///
/// Wraps the stage error that aborted a `predict` call. Callers see a single
/// human-readable message; the typed cause is preserved for logging and for
/// status-code mapping in the HTTP layer.
#[derive(Debug, thiserror::Error)]
#[error("prediction failed: {cause}")]
pub struct PredictionError {
    #[source]
    cause: Error,
}

impl PredictionError {
    /// Wrap a stage error
    pub fn new(cause: Error) -> Self {
        Self { cause }
    }

    /// The stage error that aborted the prediction
    pub fn cause(&self) -> &Error {
        &self.cause
    }

    /// Consume the wrapper, returning the stage error
    pub fn into_cause(self) -> Error {
        self.cause
    }
}

impl From<Error> for PredictionError {
    fn from(cause: Error) -> Self {
        Self::new(cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_error_preserves_cause() {
        let err = PredictionError::from(Error::LabelLookup(7));
        assert!(matches!(err.cause(), Error::LabelLookup(7)));
        assert!(err.to_string().contains("no label for class index 7"));
    }

    #[test]
    fn test_error_messages_name_the_stage() {
        assert!(Error::tokenization("bad input")
            .to_string()
            .starts_with("tokenization failed"));
        assert!(Error::not_ready("model load failed")
            .to_string()
            .starts_with("classifier not ready"));
    }
}
