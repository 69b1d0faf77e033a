use thiserror::Error;

/// Core error type for the SolBrand workflow runtime
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Malformed or missing input, caught before any network call
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Step id not present in the catalog
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    /// Debit failed; the completion was aborted with no state mutation
    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    /// Downstream ledger failure (insufficient funds, network, account missing)
    #[error("Ledger error: {0}")]
    LedgerError(String),

    /// Durable storage failure; in-memory state is preserved by the caller
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::PersistenceError(err.to_string())
    }
}

impl From<String> for CoreError {
    fn from(err: String) -> Self {
        CoreError::Other(err)
    }
}

impl From<&str> for CoreError {
    fn from(err: &str) -> Self {
        CoreError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_error_display() {
        let errors = vec![
            (
                CoreError::InvalidParameters("amount must be positive".to_string()),
                "Invalid parameters: amount must be positive",
            ),
            (
                CoreError::UnknownStep("watermark".to_string()),
                "Unknown step: watermark",
            ),
            (
                CoreError::PaymentFailed("insufficient funds".to_string()),
                "Payment failed: insufficient funds",
            ),
            (
                CoreError::LedgerError("rpc timeout".to_string()),
                "Ledger error: rpc timeout",
            ),
            (
                CoreError::PersistenceError("disk full".to_string()),
                "Persistence error: disk full",
            ),
            (
                CoreError::SerializationError("ser_err".to_string()),
                "Serialization error: ser_err",
            ),
            (
                CoreError::ConfigurationError("config_err".to_string()),
                "Configuration error: config_err",
            ),
            (CoreError::Other("other_err".to_string()), "other_err"),
        ];

        for (error, expected_msg) in errors {
            assert_eq!(error.to_string(), expected_msg);
        }
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: CoreError = json_error.into();

        match error {
            CoreError::SerializationError(msg) => {
                assert!(msg.contains("expected value"));
            }
            _ => panic!("Expected SerializationError variant"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_error = IoError::new(ErrorKind::NotFound, "file not found");
        let error: CoreError = io_error.into();

        match error {
            CoreError::PersistenceError(msg) => {
                assert!(msg.contains("file not found"));
            }
            _ => panic!("Expected PersistenceError variant"),
        }
    }

    #[test]
    fn test_from_string() {
        let error: CoreError = "test error message".to_string().into();

        match error {
            CoreError::Other(msg) => {
                assert_eq!(msg, "test error message");
            }
            _ => panic!("Expected Other variant"),
        }
    }

    #[test]
    fn test_error_clone_and_eq() {
        let original = CoreError::PaymentFailed("declined".to_string());
        let cloned = original.clone();

        assert_eq!(original, cloned);
        assert_eq!(format!("{:?}", original), format!("{:?}", cloned));
    }
}
