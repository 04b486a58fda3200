//! Telegram Bot API request/response types

use serde::{Deserialize, Serialize};

/// Telegram Bot API base URL
pub(crate) const API_BASE: &str = "https://api.telegram.org/bot";

/// Telegram file download base URL
pub(crate) const FILE_BASE: &str = "https://api.telegram.org/file/bot";

/// Telegram sendMessage request
#[derive(Serialize)]
pub(crate) struct SendMessageRequest {
    pub chat_id: i64,
    pub text: String,
}

/// Telegram setWebhook request
#[derive(Serialize)]
pub(crate) struct SetWebhookRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_updates: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_token: Option<String>,
}

/// Telegram getFile request
#[derive(Serialize)]
pub(crate) struct GetFileRequest {
    pub file_id: String,
}

/// File metadata from Telegram getFile response
#[derive(Debug, Deserialize)]
pub(crate) struct TelegramFile {
    #[allow(dead_code)]
    pub file_id: String,
    pub file_path: Option<String>,
}

/// Telegram API response wrapper
#[derive(Deserialize)]
#[allow(dead_code)]
pub(crate) struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}
