//! Error types for the SolBrand server
//!
//! This module contains the error types used throughout the server.

use solbrand_core::CoreError;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Payment refused by the token ledger
    #[error("Payment required: {0}")]
    PaymentRequired(String),

    /// Token ledger error
    #[error("Ledger error: {0}")]
    LedgerError(String),

    /// State store error
    #[error("State store error: {0}")]
    StateStoreError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

// Implement conversions from other error types
impl From<CoreError> for ServerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidParameters(msg) => ServerError::ValidationError(msg),
            CoreError::UnknownStep(step_id) => ServerError::NotFound(format!("Step {}", step_id)),
            CoreError::PaymentFailed(msg) => ServerError::PaymentRequired(msg),
            CoreError::LedgerError(msg) => ServerError::LedgerError(msg),
            CoreError::PersistenceError(msg) => ServerError::StateStoreError(msg),
            CoreError::SerializationError(msg) => {
                ServerError::InternalError(format!("Serialization error: {}", msg))
            }
            CoreError::ConfigurationError(msg) => ServerError::ConfigError(msg),
            CoreError::Other(msg) => ServerError::InternalError(msg),
        }
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::ValidationError(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::InternalError(format!("IO error: {}", err))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::InternalError(format!("Error: {}", err))
    }
}

impl ServerError {
    /// Check if the error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServerError::NotFound(_))
    }

    /// Check if the error is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ServerError::ValidationError(_))
    }

    /// Check if the error is a payment error
    pub fn is_payment_error(&self) -> bool {
        matches!(self, ServerError::PaymentRequired(_))
    }
}
