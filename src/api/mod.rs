//! HTTP API server for the Docket gateway

pub mod health;
pub mod webhooks;

use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::DbPool;
use crate::intake::IntakeEngine;
use crate::Result;

/// Shared state for API handlers
pub struct ApiState {
    /// The intake engine handling webhook events
    pub engine: Arc<IntakeEngine>,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` value, if configured
    pub webhook_secret: Option<String>,
    /// Case database (readiness checks)
    pub db: DbPool,
}

/// Build the full application router
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let webhooks = Router::new()
        .route(
            "/api/webhooks/telegram",
            post(webhooks::telegram::handle_update),
        )
        .with_state(state.clone());

    Router::new()
        .merge(health::router())
        .merge(health::ready_router(state))
        .merge(webhooks)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind and serve the API
///
/// # Errors
///
/// Returns error if the listener cannot bind or the server fails
pub async fn serve(state: Arc<ApiState>, port: u16) -> Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "webhook server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
