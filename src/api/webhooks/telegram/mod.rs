//! Telegram webhook handler

pub mod types;

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde::Serialize;

use self::types::TelegramUpdate;
use crate::api::ApiState;
use crate::intake::{DocumentRef, IntakeEvent};

/// Telegram webhook response
#[derive(Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
}

/// Handle an incoming Telegram update
///
/// Returns 200 immediately and processes the message in a background task.
/// Telegram requires fast webhook responses to avoid redelivery. Updates
/// without text or a document are acknowledged as no-ops.
pub async fn handle_update(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(update): Json<TelegramUpdate>,
) -> (StatusCode, Json<WebhookResponse>) {
    // Validate webhook secret token if configured
    if let Some(expected) = state.webhook_secret.as_deref() {
        let provided = headers
            .get("x-telegram-bot-api-secret-token")
            .and_then(|v| v.to_str().ok());

        if provided != Some(expected) {
            tracing::warn!("Telegram webhook secret mismatch");
            return (StatusCode::FORBIDDEN, Json(WebhookResponse { ok: false }));
        }
    }

    tracing::debug!(update_id = update.update_id, "received Telegram update");

    let Some(message) = update.message else {
        return (StatusCode::OK, Json(WebhookResponse { ok: true }));
    };

    // Ignore bot messages
    if message.from.as_ref().is_some_and(|u| u.is_bot) {
        return (StatusCode::OK, Json(WebhookResponse { ok: true }));
    }

    let chat_id = message.chat.id;
    let event = IntakeEvent {
        text: message.text,
        document: message.document.map(|d| DocumentRef {
            file_id: d.file_id,
            file_name: d.file_name,
        }),
    };

    if event.is_empty() {
        return (StatusCode::OK, Json(WebhookResponse { ok: true }));
    }

    // Spawn processing in background so we return 200 immediately
    let engine = Arc::clone(&state.engine);
    tokio::spawn(async move {
        engine.handle_event(chat_id, event).await;
    });

    (StatusCode::OK, Json(WebhookResponse { ok: true }))
}
