//! Health check endpoint for the SolBrand server
//!
//! This module contains the health check handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::server::SolBrandServer;

/// Health check handler
///
/// This endpoint provides basic health information about the server and its
/// dependencies: the token ledger and the workflow state store. A ledger that
/// is reachable but cannot issue credits reports DEGRADED rather than DOWN.
pub async fn health_check(State(server): State<Arc<SolBrandServer>>) -> impl IntoResponse {
    info!("Health check requested");

    // Perform basic health check
    let mut response = json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {},
    });

    // Check token ledger
    let ledger_status = match server.check_ledger_health().await {
        Ok(true) => "UP",
        Ok(false) => "DEGRADED",
        Err(_) => "DOWN",
    };
    let ledger_info = server.ledger_info();
    response["dependencies"]["ledger"] = json!({
        "status": ledger_status,
        "network": ledger_info.network,
        "mintAddress": ledger_info.mint_address,
    });

    // Check workflow state store
    let state_store_status = match server.check_state_store_health().await {
        Ok(true) => "UP",
        Ok(false) => "DEGRADED",
        Err(_) => "DOWN",
    };
    response["dependencies"]["stateStore"] = json!({
        "status": state_store_status,
    });

    // Determine overall status
    let overall_status = if ledger_status == "DOWN" || state_store_status == "DOWN" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (overall_status, Json(response))
}
