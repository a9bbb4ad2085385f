//! Workflow definition management routes. Admin-gated by the engine.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use remit_core::workflow::types::{ApprovalRule, ApprovalStep, WorkflowDefinition};
use remit_shared::types::WorkflowId;

use crate::routes::expenses::engine_error_response;
use crate::{AppState, middleware::CurrentUser};

/// Creates the workflow definition routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/workflows", post(create_workflow))
        .route("/workflows", get(list_workflows))
        .route("/workflows/{workflow_id}", get(get_workflow))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a workflow definition.
#[derive(Debug, Deserialize)]
pub struct CreateWorkflowRequest {
    /// Human-readable name.
    pub name: String,
    /// Ordered approval steps.
    #[serde(default)]
    pub steps: Vec<ApprovalStep>,
    /// Conditional rules.
    #[serde(default)]
    pub rules: Vec<ApprovalRule>,
}

/// Response for a workflow definition.
#[derive(Debug, Serialize)]
pub struct WorkflowResponse {
    /// Definition ID.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Ordered approval steps.
    pub steps: Vec<ApprovalStep>,
    /// Conditional rules.
    pub rules: Vec<ApprovalRule>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/workflows` - Create a workflow definition.
async fn create_workflow(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateWorkflowRequest>,
) -> impl IntoResponse {
    let definition = WorkflowDefinition {
        id: WorkflowId::new(),
        name: payload.name,
        steps: payload.steps,
        rules: payload.rules,
    };

    match state.engine.save_workflow(user.0.id, definition).await {
        Ok(saved) => {
            info!(
                workflow_id = %saved.id,
                name = %saved.name,
                steps = saved.steps.len(),
                "Workflow definition created"
            );
            (StatusCode::CREATED, Json(definition_to_response(saved))).into_response()
        }
        Err(e) => engine_error_response(&e),
    }
}

/// GET `/workflows` - List workflow definitions.
async fn list_workflows(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    match state.engine.list_workflows(user.0.id).await {
        Ok(definitions) => {
            let items: Vec<WorkflowResponse> =
                definitions.into_iter().map(definition_to_response).collect();
            (StatusCode::OK, Json(serde_json::json!({ "data": items }))).into_response()
        }
        Err(e) => engine_error_response(&e),
    }
}

/// GET `/workflows/{workflow_id}` - Fetch one workflow definition.
async fn get_workflow(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(workflow_id): Path<Uuid>,
) -> impl IntoResponse {
    match state
        .engine
        .get_workflow(user.0.id, WorkflowId::from_uuid(workflow_id))
        .await
    {
        Ok(definition) => {
            (StatusCode::OK, Json(definition_to_response(definition))).into_response()
        }
        Err(e) => engine_error_response(&e),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn definition_to_response(definition: WorkflowDefinition) -> WorkflowResponse {
    WorkflowResponse {
        id: definition.id.into_inner(),
        name: definition.name,
        steps: definition.steps,
        rules: definition.rules,
    }
}
