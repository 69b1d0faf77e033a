//! Error handling for the SolBrand server API
//!
//! This module contains standardized error handling for the API.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::error::ServerError;

/// General error response handler for API errors
/// This will convert a server error into the standardized `{error, details}`
/// envelope with the matching HTTP status code.
pub fn api_error_response(err: &ServerError) -> axum::response::Response {
    let err_debug = format!("{:?}", err);

    let (status_code, error_code, error_message) = match err {
        ServerError::NotFound(resource) => (
            StatusCode::NOT_FOUND,
            "ERR_NOT_FOUND",
            format!("{} not found", resource),
        ),
        ServerError::ValidationError(msg) => {
            (StatusCode::BAD_REQUEST, "ERR_VALIDATION_ERROR", msg.clone())
        }
        ServerError::PaymentRequired(msg) => (
            StatusCode::PAYMENT_REQUIRED,
            "ERR_PAYMENT_REQUIRED",
            msg.clone(),
        ),
        ServerError::LedgerError(msg) => {
            (StatusCode::BAD_GATEWAY, "ERR_LEDGER_ERROR", msg.clone())
        }
        ServerError::StateStoreError(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "ERR_STATE_STORE_ERROR",
            msg.clone(),
        ),
        ServerError::ConfigError(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "ERR_CONFIG_ERROR",
            msg.clone(),
        ),
        ServerError::InternalError(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "ERR_INTERNAL_SERVER_ERROR",
            msg.clone(),
        ),
    };

    // Create standardized error response
    let error_response = json!({
        "error": error_message,
        "details": {
            "errorCode": error_code,
            "errorMessage": error_message,
            "debug": err_debug,
        }
    });

    (status_code, Json(error_response)).into_response()
}
