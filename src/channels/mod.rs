//! Chat gateway abstraction
//!
//! The intake engine talks to the messaging platform only through the
//! `ChatGateway` trait, so transitions and the submission flow can be
//! exercised against a mock in tests.

pub mod telegram;

use async_trait::async_trait;

use crate::Result;

pub use telegram::TelegramChannel;

/// Outbound message delivery and file retrieval for one messaging platform
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send a text message to a chat
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;

    /// Resolve a file handle and download its bytes
    ///
    /// Returns the raw bytes and the platform-side file path (used as a
    /// fallback source for the display name).
    async fn download_file(&self, file_id: &str) -> Result<(Vec<u8>, String)>;
}
