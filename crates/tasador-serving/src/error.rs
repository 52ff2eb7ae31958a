//! Error types for the tasador-serving crate.
//!
//! Every failure is local to one request or one load. None of them mutate the
//! loaded schema or model, and none are retried.

use tasador_core::CoreError;
use thiserror::Error;

/// Result type alias for serving operations.
pub type ServingResult<T> = Result<T, ServingError>;

/// Errors that can occur while loading artifacts or predicting.
#[derive(Debug, Error)]
pub enum ServingError {
    /// A model artifact is missing or malformed.
    #[error("Failed to load model: {0}")]
    ModelLoadError(String),

    /// The schema artifact is invalid.
    #[error("Invalid feature schema: {0}")]
    SchemaError(String),

    /// The feature vector does not have the shape the model was trained on.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The model failed while evaluating.
    #[error("Prediction failed: {0}")]
    PredictionFailure(String),

    /// The submitted property record was rejected.
    #[error("Invalid input: {0}")]
    InvalidRecord(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ServingError {
    /// Create a model load error.
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoadError(msg.into())
    }

    /// Create a schema mismatch error.
    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    /// Create a schema mismatch error for a vector of the wrong length.
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self::SchemaMismatch(format!(
            "model expects {expected} features, got {actual}"
        ))
    }

    /// Create a prediction failure.
    pub fn prediction(msg: impl Into<String>) -> Self {
        Self::PredictionFailure(msg.into())
    }

    /// Check if this error was caused by the submitted input.
    ///
    /// Every other variant comes from the model, its artifacts or the
    /// configuration.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRecord(_))
    }
}

impl From<CoreError> for ServingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidSchema { message } => ServingError::SchemaError(message),
            other => ServingError::InvalidRecord(other.to_string()),
        }
    }
}

impl From<candle_core::Error> for ServingError {
    fn from(err: candle_core::Error) -> Self {
        ServingError::PredictionFailure(err.to_string())
    }
}
