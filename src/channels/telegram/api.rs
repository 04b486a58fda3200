//! Raw Telegram Bot API calls

use super::types::{
    API_BASE, FILE_BASE, GetFileRequest, SendMessageRequest, SetWebhookRequest, TelegramFile,
    TelegramResponse,
};
use crate::{Error, Result};

impl super::TelegramChannel {
    /// Send a message to a chat
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub(crate) async fn send_message_raw(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = format!("{API_BASE}{}/sendMessage", self.token);

        let request = SendMessageRequest {
            chat_id,
            text: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram API error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_lower = body.to_lowercase();

            // No point retrying unreachable chats
            if body_lower.contains("chat not found")
                || body_lower.contains("bot was blocked by the user")
            {
                return Err(Error::Channel(format!(
                    "Telegram chat {chat_id} not reachable: {body}"
                )));
            }

            return Err(Error::Channel(format!(
                "Telegram API error: {status} - {body}"
            )));
        }

        tracing::debug!(chat_id, "Telegram message sent");
        Ok(())
    }

    /// Download a file from Telegram by `file_id`.
    ///
    /// Calls `getFile` to get the file path, then downloads from
    /// `https://api.telegram.org/file/bot{token}/{file_path}`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request or download fails
    pub(crate) async fn download_file_raw(&self, file_id: &str) -> Result<(Vec<u8>, String)> {
        let url = format!("{API_BASE}{}/getFile", self.token);

        let request = GetFileRequest {
            file_id: file_id.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram getFile error: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::Channel(format!("Telegram getFile response read error: {e}")))?;

        let parsed: TelegramResponse<TelegramFile> = serde_json::from_str(&body)
            .map_err(|e| Error::Channel(format!("Telegram getFile parse error: {e}")))?;

        let file = parsed.result.ok_or_else(|| {
            Error::Channel(format!(
                "Telegram getFile error: {}",
                parsed.description.unwrap_or_default()
            ))
        })?;

        let file_path = file
            .file_path
            .ok_or_else(|| Error::Channel("Telegram getFile returned no file_path".to_string()))?;

        let download_url = format!("{FILE_BASE}{}/{file_path}", self.token);
        let data = self
            .client
            .get(&download_url)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram file download error: {e}")))?
            .bytes()
            .await
            .map_err(|e| Error::Channel(format!("Telegram file download read error: {e}")))?;

        Ok((data.to_vec(), file_path))
    }

    /// Set webhook URL for receiving updates
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<()> {
        let api_url = format!("{API_BASE}{}/setWebhook", self.token);

        let request = SetWebhookRequest {
            url: url.to_string(),
            allowed_updates: Some(vec!["message".to_string()]),
            secret_token: secret_token.map(String::from),
        };

        let response = self
            .client
            .post(&api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram setWebhook error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Channel(format!(
                "Telegram setWebhook error: {status} - {body}"
            )));
        }

        tracing::info!(url, "Telegram webhook set");
        Ok(())
    }

    /// Delete webhook (stop receiving updates)
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn delete_webhook(&self) -> Result<()> {
        let url = format!("{API_BASE}{}/deleteWebhook", self.token);

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram deleteWebhook error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Channel(format!(
                "Telegram deleteWebhook error: {status} - {body}"
            )));
        }

        tracing::info!("Telegram webhook deleted");
        Ok(())
    }

    /// Validate the bot token by calling `getMe`
    ///
    /// # Errors
    ///
    /// Returns error if the token is invalid
    pub async fn get_me(&self) -> Result<()> {
        let url = format!("{API_BASE}{}/getMe", self.token);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("Telegram getMe error: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Channel("Invalid Telegram bot token".to_string()));
        }

        Ok(())
    }
}
