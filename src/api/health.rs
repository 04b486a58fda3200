//! Health check endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::Serialize;

use super::ApiState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed readiness response
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: ReadinessChecks,
}

/// Individual readiness checks
#[derive(Serialize)]
pub struct ReadinessChecks {
    pub database: CheckResult,
    pub webhook: CheckResult,
}

/// Result of a single health check
#[derive(Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    const fn ok() -> Self {
        Self {
            status: "ok",
            message: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            status: "fail",
            message: Some(message.into()),
        }
    }

    fn unavailable() -> Self {
        Self {
            status: "unavailable",
            message: Some("not configured".to_string()),
        }
    }
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe - is the service ready to accept traffic?
async fn ready(State(state): State<Arc<ApiState>>) -> (StatusCode, Json<ReadinessResponse>) {
    let db_check = check_database(&state);
    let webhook_check = if state.webhook_secret.is_some() {
        CheckResult::ok()
    } else {
        CheckResult::unavailable()
    };

    let all_ok = db_check.status == "ok";

    let status = if all_ok { "ok" } else { "degraded" };
    let http_status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(ReadinessResponse {
            status,
            checks: ReadinessChecks {
                database: db_check,
                webhook: webhook_check,
            },
        }),
    )
}

/// Check database connectivity
fn check_database(state: &ApiState) -> CheckResult {
    match state.db.get() {
        Ok(conn) => match conn.query_row("SELECT 1", [], |_| Ok(())) {
            Ok(()) => CheckResult::ok(),
            Err(e) => CheckResult::fail(format!("query failed: {e}")),
        },
        Err(e) => CheckResult::fail(format!("connection failed: {e}")),
    }
}

/// Build health router (liveness only, no state needed)
#[must_use]
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// Build readiness router (needs state for checks)
#[must_use]
pub fn ready_router(state: Arc<ApiState>) -> Router {
    Router::new().route("/ready", get(ready)).with_state(state)
}
