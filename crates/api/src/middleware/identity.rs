//! Identity middleware for protected routes.
//!
//! Credential issuance and session handling live outside this service;
//! the transport hands us an opaque current-user reference which this
//! middleware resolves against the directory. Unknown, malformed, or
//! deactivated identities are rejected before any handler runs.

use std::str::FromStr;

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use remit_core::directory::UserProfile;
use remit_shared::types::UserId;

use crate::AppState;

/// Header carrying the acting user's identity.
pub const USER_HEADER: &str = "x-user-id";

/// Identity middleware resolving the current user.
///
/// This middleware:
/// 1. Reads the `X-User-Id` header
/// 2. Resolves it to an active profile via the directory
/// 3. Stores the profile in request extensions for handlers to access
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(USER_HEADER)
        .and_then(|h| h.to_str().ok());

    let Some(user_id) = header.and_then(|h| UserId::from_str(h).ok()) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "missing_identity",
                "message": "X-User-Id header with a valid user id is required"
            })),
        )
            .into_response();
    };

    match state.directory.profile(user_id).await {
        Ok(Some(profile)) if profile.is_active => {
            request.extensions_mut().insert(profile);
            next.run(request).await
        }
        Ok(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "unknown_identity",
                "message": "No active user for the supplied identity"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Directory lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// Extractor for the resolved current user.
///
/// Use this in handlers to get the acting user's profile:
///
/// ```ignore
/// async fn handler(user: CurrentUser) -> impl IntoResponse {
///     let id = user.0.id;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserProfile);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserProfile>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "unauthorized",
                        "message": "Identity required"
                    })),
                )
            })
    }
}
