//! API module for the SolBrand server
//!
//! This module contains the API routes and handlers for the SolBrand server.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod errors;
pub mod health;
pub mod tokens;
pub mod workflow;

use crate::server::SolBrandServer;

/// Build the router for API endpoints
pub fn build_router(server: Arc<SolBrandServer>) -> Router {
    Router::new()
        // Token operations
        .route(
            "/v1/tokens/consume",
            post(tokens::consume_tokens_handler).get(tokens::consume_status_handler),
        )
        .route(
            "/v1/tokens/mint",
            post(tokens::mint_tokens_handler).get(tokens::mint_status_handler),
        )
        .route("/v1/balance/:holder", get(tokens::get_balance_handler))
        // Workflow management
        .route("/v1/workflows/:session", get(workflow::get_workflow_handler))
        .route(
            "/v1/workflows/:session/steps",
            get(workflow::list_step_statuses_handler),
        )
        .route(
            "/v1/workflows/:session/steps/:step_id/complete",
            post(workflow::complete_step_handler),
        )
        .route(
            "/v1/workflows/:session/steps/:step_id/select",
            post(workflow::select_step_handler),
        )
        .route(
            "/v1/workflows/:session/activities",
            get(workflow::list_activities_handler),
        )
        // Health check
        .route("/health", get(health::health_check))
        // Request tracing
        .layer(TraceLayer::new_for_http())
        // Shared state
        .with_state(server)
}

// Re-export all modules for easier imports
pub use errors::*;
pub use health::*;
pub use tokens::*;
pub use workflow::*;
