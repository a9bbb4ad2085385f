//! Expense submission, listing, and decision routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use remit_core::engine::{Decision, EngineError, ExpenseFilter, SubmitExpense};
use remit_core::expense::types::{Expense, ExpenseCategory, ExpenseStatus};
use remit_shared::types::{Currency, ExpenseId, PageRequest, PageResponse, WorkflowId};

use crate::{AppState, middleware::CurrentUser};

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", post(submit_expense))
        .route("/expenses", get(list_expenses))
        .route("/expenses/{expense_id}", get(get_expense))
        .route("/expenses/{expense_id}/decision", post(record_decision))
        .route("/expenses/{expense_id}/force-approval", post(force_approval))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting an expense.
#[derive(Debug, Deserialize)]
pub struct SubmitExpenseRequest {
    /// Claimed amount as a decimal string.
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Category name (travel, meals, supplies, ...).
    pub category: String,
    /// Free-text description.
    pub description: String,
    /// Date the expense was incurred, `YYYY-MM-DD`.
    pub expense_date: String,
    /// Optional workflow definition id; absent selects the default chain.
    pub workflow_id: Option<Uuid>,
}

/// Request body for recording a decision.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    /// "approve" or "reject".
    pub action: String,
    /// Approver comment; required for rejections.
    pub comment: Option<String>,
}

/// Request body for the admin force-approval override.
#[derive(Debug, Deserialize)]
pub struct ForceApprovalRequest {
    /// Optional override comment.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Query parameters for expense listing.
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    /// Restrict to this status.
    pub status: Option<String>,
    /// Restrict to this category.
    pub category: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Response for a single audit trail event.
#[derive(Debug, Serialize)]
pub struct AuditEventResponse {
    /// Acting user.
    pub actor: Uuid,
    /// Recorded action.
    pub action: String,
    /// Chain step the event was recorded at.
    pub step: u32,
    /// Approver comment, if any.
    pub comment: Option<String>,
    /// Timestamp.
    pub at: String,
}

/// Response for an expense.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    /// Expense ID.
    pub id: Uuid,
    /// Submitting employee.
    pub owner: Uuid,
    /// Claimed amount.
    pub amount: String,
    /// Currency of the claimed amount.
    pub currency: String,
    /// Cached base-currency display amount.
    pub display_amount: String,
    /// Base currency code.
    pub display_currency: String,
    /// Category name.
    pub category: String,
    /// Description.
    pub description: String,
    /// Expense date.
    pub expense_date: String,
    /// Current status.
    pub status: String,
    /// 1-based current chain step.
    pub current_step: u32,
    /// Name of the governing workflow snapshot.
    pub workflow: String,
    /// Audit trail, oldest first.
    pub trail: Vec<AuditEventResponse>,
    /// Submission timestamp.
    pub submitted_at: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/expenses` - Submit a new expense claim for the current user.
async fn submit_expense(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<SubmitExpenseRequest>,
) -> impl IntoResponse {
    let amount = match Decimal::from_str(&payload.amount) {
        Ok(a) => a,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_amount",
                    "message": "Invalid amount format"
                })),
            )
                .into_response();
        }
    };

    let Ok(currency) = Currency::from_str(&payload.currency) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_currency",
                "message": format!("Unknown currency: {}", payload.currency)
            })),
        )
            .into_response();
    };

    let Ok(expense_date) = NaiveDate::parse_from_str(&payload.expense_date, "%Y-%m-%d") else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_date",
                "message": "Expense date must be YYYY-MM-DD"
            })),
        )
            .into_response();
    };

    let input = SubmitExpense {
        owner: user.0.id,
        amount,
        currency,
        category: payload.category,
        description: payload.description,
        expense_date,
        workflow_id: payload.workflow_id.map(WorkflowId::from_uuid),
    };

    match state.engine.submit(input).await {
        Ok(expense) => {
            info!(
                expense_id = %expense.id,
                owner = %expense.owner,
                "Expense submitted"
            );
            (StatusCode::CREATED, Json(expense_to_response(expense))).into_response()
        }
        Err(e) => engine_error_response(&e),
    }
}

/// GET `/expenses` - List expenses visible to the current user.
async fn list_expenses(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListExpensesQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        Some(s) => match ExpenseStatus::parse(s) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": format!("Unknown status: {s}")
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let category = match query.category.as_deref() {
        Some(s) => match ExpenseCategory::parse(s) {
            Some(category) => Some(category),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_category",
                        "message": format!("Unknown category: {s}")
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let filter = ExpenseFilter { status, category };
    match state.engine.list_for(user.0.id, &filter).await {
        Ok(expenses) => {
            let request = PageRequest {
                page: query.page.unwrap_or(1),
                per_page: query.per_page.unwrap_or(20),
            };
            let items: Vec<ExpenseResponse> =
                expenses.into_iter().map(expense_to_response).collect();
            (StatusCode::OK, Json(PageResponse::paginate(items, &request))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list expenses");
            engine_error_response(&e)
        }
    }
}

/// GET `/expenses/{expense_id}` - Fetch one expense, scoped.
async fn get_expense(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(expense_id): Path<Uuid>,
) -> impl IntoResponse {
    match state
        .engine
        .get(ExpenseId::from_uuid(expense_id), user.0.id)
        .await
    {
        Ok(expense) => (StatusCode::OK, Json(expense_to_response(expense))).into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// POST `/expenses/{expense_id}/decision` - Approve or reject at the
/// current step.
async fn record_decision(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<DecisionRequest>,
) -> impl IntoResponse {
    let Some(decision) = Decision::parse(&payload.action) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_action",
                "message": "Action must be 'approve' or 'reject'"
            })),
        )
            .into_response();
    };

    match state
        .engine
        .decide(
            ExpenseId::from_uuid(expense_id),
            user.0.id,
            decision,
            payload.comment,
        )
        .await
    {
        Ok(expense) => {
            info!(
                expense_id = %expense.id,
                actor = %user.0.id,
                action = decision.as_str(),
                status = %expense.status,
                "Decision recorded"
            );
            (StatusCode::OK, Json(expense_to_response(expense))).into_response()
        }
        Err(e) => engine_error_response(&e),
    }
}

/// POST `/expenses/{expense_id}/force-approval` - Admin override bypassing
/// remaining steps.
async fn force_approval(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ForceApprovalRequest>,
) -> impl IntoResponse {
    match state
        .engine
        .force_approve(ExpenseId::from_uuid(expense_id), user.0.id, payload.comment)
        .await
    {
        Ok(expense) => {
            info!(
                expense_id = %expense.id,
                actor = %user.0.id,
                "Expense force-approved"
            );
            (StatusCode::OK, Json(expense_to_response(expense))).into_response()
        }
        Err(e) => engine_error_response(&e),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn expense_to_response(expense: Expense) -> ExpenseResponse {
    let trail = expense
        .trail
        .iter()
        .map(|event| AuditEventResponse {
            actor: event.actor.into_inner(),
            action: event.action.as_str().to_string(),
            step: event.step,
            comment: event.comment.clone(),
            at: event.at.to_rfc3339(),
        })
        .collect();

    ExpenseResponse {
        id: expense.id.into_inner(),
        owner: expense.owner.into_inner(),
        amount: expense.amount.amount.to_string(),
        currency: expense.amount.currency.to_string(),
        display_amount: expense.display_amount.amount.to_string(),
        display_currency: expense.display_amount.currency.to_string(),
        category: expense.category.to_string(),
        description: expense.description,
        expense_date: expense.expense_date.to_string(),
        status: expense.status.to_string(),
        current_step: expense.current_step,
        workflow: expense.workflow.name,
        trail,
        submitted_at: expense.submitted_at.to_rfc3339(),
    }
}

/// Maps an engine error to an `{error, message}` body.
pub(crate) fn engine_error_response(e: &EngineError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = if status.is_server_error() {
        error!(error = %e, "Engine operation failed");
        "An error occurred".to_string()
    } else {
        e.to_string()
    };

    (
        status,
        Json(json!({
            "error": e.error_code().to_lowercase(),
            "message": message
        })),
    )
        .into_response()
}
