//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for expenses and workflow definitions
//! - Identity middleware resolving the opaque current-user context
//! - Response types

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use remit_core::directory::UserDirectory;
use remit_core::engine::ApprovalEngine;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The approval engine.
    pub engine: Arc<ApprovalEngine>,
    /// Identity directory; the session layer resolves users against it.
    pub directory: Arc<dyn UserDirectory>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
