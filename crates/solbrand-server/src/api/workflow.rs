//! Workflow API for step gating, completion and activity history
//!
//! This module contains the handlers for the per-session workflow surface.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use solbrand_core::{ActivityEntry, StepId, StepPayload, StepStatus};

use crate::api::errors::api_error_response;
use crate::api::tokens::BalanceResponse;
use crate::server::SolBrandServer;

/// Query parameters for step status listings
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StepStatusQuery {
    /// Holder whose balance gates step accessibility; absent gates as zero
    pub holder: Option<String>,
}

/// Response for listing step statuses
#[derive(Debug, Serialize, Deserialize)]
pub struct StepStatusesResponse {
    /// Catalog steps with the session's progress flags
    pub steps: Vec<StepStatus>,
}

/// Request to complete a workflow step
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteStepRequest {
    /// Holder paying for the step; only the free terminal step may omit it
    #[serde(default)]
    pub holder_address: Option<String>,
    /// Step output payload, tagged by step id
    pub payload: StepPayload,
}

/// Response for a committed step completion
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteStepResponse {
    /// Always true on the success path
    pub success: bool,
    /// The committed step
    pub step_id: StepId,
    /// The step's cost as a decimal string
    pub cost: String,
    /// Whether this completion debited the ledger
    pub charged: bool,
    /// Refreshed balance after the debit; absent for the free terminal step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<BalanceResponse>,
}

/// Request for caller-driven step navigation
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectStepRequest {
    /// Holder whose balance gates not-yet-completed steps
    #[serde(default)]
    pub holder_address: Option<String>,
}

/// Response for listing a session's activities
#[derive(Debug, Serialize, Deserialize)]
pub struct ActivitiesResponse {
    /// Activity entries, newest first
    pub activities: Vec<ActivityEntry>,
}

/// Handler for reading a session's workflow state
pub async fn get_workflow_handler(
    State(server): State<Arc<SolBrandServer>>,
    Path(session): Path<String>,
) -> impl IntoResponse {
    info!(%session, "Getting workflow state");

    match server.workflow_state(&session).await {
        Ok(state) => (StatusCode::OK, Json(state)).into_response(),
        Err(err) => {
            error!(?err, %session, "Failed to get workflow state");
            api_error_response(&err)
        }
    }
}

/// Handler for listing catalog steps with a session's progress flags
pub async fn list_step_statuses_handler(
    State(server): State<Arc<SolBrandServer>>,
    Path(session): Path<String>,
    Query(query): Query<StepStatusQuery>,
) -> impl IntoResponse {
    info!(%session, "Listing step statuses");

    match server
        .step_statuses(&session, query.holder.as_deref())
        .await
    {
        Ok(steps) => (StatusCode::OK, Json(StepStatusesResponse { steps })).into_response(),
        Err(err) => {
            error!(?err, %session, "Failed to list step statuses");
            api_error_response(&err)
        }
    }
}

/// Handler for completing a workflow step
pub async fn complete_step_handler(
    State(server): State<Arc<SolBrandServer>>,
    Path((session, step_id)): Path<(String, String)>,
    Json(request): Json<CompleteStepRequest>,
) -> impl IntoResponse {
    info!(%session, %step_id, "Completing workflow step");

    match server
        .complete_step(
            &session,
            request.holder_address.as_deref(),
            &step_id,
            request.payload,
        )
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            error!(?err, %session, %step_id, "Failed to complete step");
            api_error_response(&err)
        }
    }
}

/// Handler for caller-driven step navigation
pub async fn select_step_handler(
    State(server): State<Arc<SolBrandServer>>,
    Path((session, step_id)): Path<(String, String)>,
    Json(request): Json<SelectStepRequest>,
) -> impl IntoResponse {
    info!(%session, %step_id, "Selecting workflow step");

    match server
        .select_step(&session, request.holder_address.as_deref(), &step_id)
        .await
    {
        Ok(state) => (StatusCode::OK, Json(state)).into_response(),
        Err(err) => {
            error!(?err, %session, %step_id, "Failed to select step");
            api_error_response(&err)
        }
    }
}

/// Handler for listing a session's activity feed
pub async fn list_activities_handler(
    State(server): State<Arc<SolBrandServer>>,
    Path(session): Path<String>,
) -> impl IntoResponse {
    info!(%session, "Listing activities");

    match server.activities(&session).await {
        Ok(activities) => {
            (StatusCode::OK, Json(ActivitiesResponse { activities })).into_response()
        }
        Err(err) => {
            error!(?err, %session, "Failed to list activities");
            api_error_response(&err)
        }
    }
}
