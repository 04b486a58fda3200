//! Configuration management for Docket gateway

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use self::file::DocketConfigFile;
use crate::{Error, Result};

/// Default webhook server port
const DEFAULT_PORT: u16 = 8085;

/// Default session expiration window (seconds)
const DEFAULT_SESSION_TTL_SECS: u64 = 120;

/// Default classification request timeout — generous, the downstream side
/// runs ML models
const DEFAULT_PROCESSING_TIMEOUT_SECS: u64 = 300;

/// Default RAG load request timeout (seconds)
const DEFAULT_RAG_TIMEOUT_SECS: u64 = 120;

/// Delay between the success summary and the session reset prompt (seconds)
const DEFAULT_RESET_DELAY_SECS: u64 = 2;

/// Docket gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Webhook server configuration
    pub server: ServerConfig,

    /// Telegram bot configuration
    pub telegram: TelegramConfig,

    /// Session store configuration
    pub session: SessionConfig,

    /// Downstream classification service
    pub processing: ProcessingConfig,

    /// RAG indexing service
    pub rag: RagConfig,

    /// Path to data directory (database, attachment scratch space)
    pub data_dir: PathBuf,

    /// Delay before the post-success session reset fires
    pub reset_delay: Duration,
}

/// Webhook server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
}

/// Telegram bot configuration
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token; absent means the bot cannot be started
    pub token: Option<String>,

    /// Expected `X-Telegram-Bot-Api-Secret-Token` header value
    pub webhook_secret: Option<String>,
}

/// Session store configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Redis URL; `None` selects the in-process store
    pub redis_url: Option<String>,

    /// Key prefix for session entries
    pub key_prefix: String,

    /// Sliding expiration window applied on every write
    pub ttl: Duration,
}

/// Downstream classification service configuration
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Base URL of the classification service
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,
}

/// RAG indexing service configuration
#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Base URL of the RAG service
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,
}

impl Config {
    /// Load configuration: defaults, overlaid by the TOML config file,
    /// overlaid by environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let file = Self::load_file()?;

        let data_dir = env_var("DOCKET_DATA_DIR")
            .map(PathBuf::from)
            .or_else(|| file.server.data_dir.as_ref().map(PathBuf::from))
            .or_else(|| {
                ProjectDirs::from("dev", "docket", "docket")
                    .map(|dirs| dirs.data_dir().to_path_buf())
            })
            .ok_or_else(|| Error::Config("cannot determine data directory".to_string()))?;

        let port = env_var("DOCKET_PORT")
            .and_then(|v| v.parse().ok())
            .or(file.server.port)
            .unwrap_or(DEFAULT_PORT);

        let telegram = TelegramConfig {
            token: env_var("TELEGRAM_BOT_TOKEN").or(file.telegram.token),
            webhook_secret: env_var("TELEGRAM_WEBHOOK_SECRET").or(file.telegram.webhook_secret),
        };

        let session = SessionConfig {
            redis_url: env_var("REDIS_URL").or(file.session.redis_url),
            key_prefix: env_var("DOCKET_SESSION_PREFIX")
                .or(file.session.key_prefix)
                .unwrap_or_else(|| "session".to_string()),
            ttl: Duration::from_secs(
                env_var("DOCKET_SESSION_TTL_SECS")
                    .and_then(|v| v.parse().ok())
                    .or(file.session.ttl_secs)
                    .unwrap_or(DEFAULT_SESSION_TTL_SECS),
            ),
        };

        let processing = ProcessingConfig {
            base_url: env_var("PROCESSING_SERVER_URL")
                .or(file.processing.base_url)
                .unwrap_or_else(|| "http://localhost:8000".to_string()),
            timeout: Duration::from_secs(
                env_var("PROCESSING_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .or(file.processing.timeout_secs)
                    .unwrap_or(DEFAULT_PROCESSING_TIMEOUT_SECS),
            ),
        };

        let rag = RagConfig {
            base_url: env_var("RAG_SERVER_URL")
                .or(file.rag.base_url)
                .unwrap_or_else(|| "http://localhost:8001".to_string()),
            timeout: Duration::from_secs(
                env_var("RAG_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .or(file.rag.timeout_secs)
                    .unwrap_or(DEFAULT_RAG_TIMEOUT_SECS),
            ),
        };

        let reset_delay = Duration::from_secs(
            env_var("DOCKET_RESET_DELAY_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RESET_DELAY_SECS),
        );

        Ok(Self {
            server: ServerConfig { port },
            telegram,
            session,
            processing,
            rag,
            data_dir,
            reset_delay,
        })
    }

    /// Path to the attachment scratch directory
    #[must_use]
    pub fn attachment_dir(&self) -> PathBuf {
        self.data_dir.join("tmp")
    }

    /// Path to the case database
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("docket.db")
    }

    /// The bot token, or a config error if unset
    ///
    /// # Errors
    ///
    /// Returns error if no token is configured.
    pub fn require_token(&self) -> Result<&str> {
        self.telegram
            .token
            .as_deref()
            .ok_or_else(|| Error::Config("TELEGRAM_BOT_TOKEN is not set".to_string()))
    }

    /// Read and parse the TOML config file, if present
    fn load_file() -> Result<DocketConfigFile> {
        let path = env_var("DOCKET_CONFIG").map(PathBuf::from).or_else(|| {
            ProjectDirs::from("dev", "docket", "docket")
                .map(|dirs| dirs.config_dir().join("config.toml"))
        });

        match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(&path)?;
                let parsed = toml::from_str(&raw)?;
                tracing::debug!(path = %path.display(), "loaded config file");
                Ok(parsed)
            }
            _ => Ok(DocketConfigFile::default()),
        }
    }
}

/// Read a non-empty environment variable
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
