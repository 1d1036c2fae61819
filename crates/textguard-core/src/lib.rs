//! TextGuard Core
//!
//! Shared types and error handling for the TextGuard classification service.
//!
//! This crate provides:
//! - Request/response types for the prediction contract
//! - The stage-level error taxonomy and the `PredictionError` wrapper
//!   returned by the service facade

pub mod error;
pub mod types;

pub use error::{Error, PredictionError, Result};
pub use types::{PredictionRequest, PredictionResponse, MAX_BATCH_TEXTS};
