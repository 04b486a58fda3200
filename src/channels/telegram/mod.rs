//! Telegram channel adapter
//!
//! Receives updates via webhook; sends messages and downloads files
//! through the Bot API.

mod api;
pub mod types;

use async_trait::async_trait;
use reqwest::Client;

use super::ChatGateway;
use crate::Result;

/// Telegram channel adapter
#[derive(Debug, Clone)]
pub struct TelegramChannel {
    token: String,
    client: Client,
}

impl TelegramChannel {
    /// Create a new Telegram channel adapter
    #[must_use]
    pub fn new(token: String) -> Self {
        Self {
            token,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ChatGateway for TelegramChannel {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send_message_raw(chat_id, text).await
    }

    async fn download_file(&self, file_id: &str) -> Result<(Vec<u8>, String)> {
        self.download_file_raw(file_id).await
    }
}
