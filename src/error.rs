//! Error types for Docket gateway

use thiserror::Error;

/// Result type alias for Docket operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Docket gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Telegram channel error
    #[error("channel error: {0}")]
    Channel(String),

    /// Session store error
    #[error("session error: {0}")]
    Session(String),

    /// Attachment storage error
    #[error("attachment error: {0}")]
    Attachment(String),

    /// Classification service submission error
    #[error("processing error: {0}")]
    Processing(String),

    /// RAG index loading error
    #[error("indexing error: {0}")]
    Indexing(String),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
