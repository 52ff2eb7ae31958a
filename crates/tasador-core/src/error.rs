//! Error types for the tasador core library.
//!
//! This module defines the errors raised while collecting property records and
//! compiling feature schemas. Alignment itself never fails.

use thiserror::Error;

/// The main error type for tasador-core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required field was not supplied.
    #[error("Missing value for field '{field}'")]
    MissingField {
        /// Name of the missing field.
        field: String,
    },

    /// A field name is not part of the property form.
    #[error("Unknown field '{field}'")]
    UnknownField {
        /// The unrecognised field name.
        field: String,
    },

    /// A numeric value fell outside its declared range.
    #[error("Value {value} for field '{field}' is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        /// Name of the field.
        field: String,
        /// The rejected value.
        value: f64,
        /// Lower bound of the domain.
        min: f64,
        /// Upper bound of the domain (`inf` when unbounded).
        max: f64,
    },

    /// An integral field received a fractional value.
    #[error("Field '{field}' expects a whole number, got {value}")]
    NotIntegral {
        /// Name of the field.
        field: String,
        /// The rejected value.
        value: f64,
    },

    /// A numeric field received NaN or infinity.
    #[error("Field '{field}' expects a finite number")]
    NotFinite {
        /// Name of the field.
        field: String,
    },

    /// A value could not be interpreted as the field's type.
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue {
        /// Name of the field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// A categorical value is not one of the field's choices.
    #[error("'{value}' is not a valid choice for field '{field}'")]
    UnknownChoice {
        /// Name of the field.
        field: String,
        /// The rejected value.
        value: String,
    },

    /// The feature schema is malformed.
    #[error("Invalid feature schema: {message}")]
    InvalidSchema {
        /// A description of the problem.
        message: String,
    },

    /// Error raised by the source a record is collected from.
    #[error("Input source error: {message}")]
    Source {
        /// A description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Create an invalid value error.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Create a source error.
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }
}

/// A specialized Result type for tasador-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
