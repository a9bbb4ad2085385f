//! Remit API Server
//!
//! Main entry point for the Remit expense approval service.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use remit_api::{AppState, create_router};
use remit_core::currency::FixedRates;
use remit_core::directory::{InMemoryDirectory, UserProfile};
use remit_core::engine::ApprovalEngine;
use remit_core::store::{InMemoryExpenseStore, InMemoryWorkflowStore};
use remit_shared::AppConfig;
use remit_shared::types::Currency;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "remit=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    let base_currency = Currency::from_str(&config.engine.base_currency)
        .map_err(|e| anyhow::anyhow!("Invalid base currency: {e}"))?;

    // Build the identity directory, optionally seeded from a profile file
    let directory = Arc::new(load_directory(config.directory.seed.as_deref())?);

    // Wire the engine over in-memory stores
    let engine = Arc::new(ApprovalEngine::new(
        Arc::new(InMemoryExpenseStore::new()),
        Arc::new(InMemoryWorkflowStore::new()),
        directory.clone(),
        Arc::new(FixedRates::new()),
        base_currency,
    ));
    info!(base_currency = %base_currency, "Approval engine ready");

    // Create application state and router
    let state = AppState { engine, directory };
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads user profiles from a JSON seed file, or returns an empty
/// directory when no seed is configured.
fn load_directory(seed: Option<&str>) -> anyhow::Result<InMemoryDirectory> {
    let Some(path) = seed else {
        return Ok(InMemoryDirectory::new());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read directory seed {path}"))?;
    let profiles: Vec<UserProfile> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse directory seed {path}"))?;

    info!(count = profiles.len(), path, "Seeded identity directory");
    Ok(InMemoryDirectory::from_profiles(profiles))
}
