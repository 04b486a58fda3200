//! TOML configuration file loading
//!
//! Supports `~/.config/docket/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct DocketConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Telegram bot configuration
    #[serde(default)]
    pub telegram: TelegramFileConfig,

    /// Session store configuration
    #[serde(default)]
    pub session: SessionFileConfig,

    /// Downstream classification service configuration
    #[serde(default)]
    pub processing: ProcessingFileConfig,

    /// RAG indexing service configuration
    #[serde(default)]
    pub rag: RagFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Webhook server port
    pub port: Option<u16>,

    /// Data directory override (database, attachment scratch space)
    pub data_dir: Option<String>,
}

/// Telegram bot configuration
#[derive(Debug, Default, Deserialize)]
pub struct TelegramFileConfig {
    /// Bot token
    pub token: Option<String>,

    /// Webhook secret token (`X-Telegram-Bot-Api-Secret-Token`)
    pub webhook_secret: Option<String>,
}

/// Session store configuration
#[derive(Debug, Default, Deserialize)]
pub struct SessionFileConfig {
    /// Redis URL; omit to use the in-process store
    pub redis_url: Option<String>,

    /// Key prefix (defaults to "session")
    pub key_prefix: Option<String>,

    /// Sliding expiration window in seconds
    pub ttl_secs: Option<u64>,
}

/// Downstream classification service configuration
#[derive(Debug, Default, Deserialize)]
pub struct ProcessingFileConfig {
    /// Base URL of the classification service
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// RAG indexing service configuration
#[derive(Debug, Default, Deserialize)]
pub struct RagFileConfig {
    /// Base URL of the RAG service
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}
