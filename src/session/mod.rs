//! Per-chat session persistence
//!
//! Sessions live in an external TTL key-value store under
//! `session:<chatId>`. Every write refreshes the expiration window, so an
//! abandoned conversation simply ages out. Reads and writes are atomic per
//! key with last-write-wins semantics; there is no compare-and-swap, so two
//! in-flight events for the same chat can race. Within one event the handler
//! always reads, transitions, then writes.
//!
//! A Redis backend is used when a URL is configured; otherwise an in-process
//! map with the same TTL behavior serves single-instance deployments and
//! tests.

mod redis_backend;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use self::redis_backend::RedisSessionBackend;
use crate::config::SessionConfig;
use crate::intake::Session;
use crate::Result;

/// Outcome of a session lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    /// A stored session decoded cleanly
    Found(Session),
    /// No stored session (never created, or expired)
    Missing,
    /// A stored payload that no longer decodes; the caller must reset
    Corrupt,
}

/// One in-process entry: serialized payload plus its expiry instant
#[derive(Debug)]
struct MemoryEntry {
    payload: String,
    expires_at: Instant,
}

/// Session store over Redis or an in-process map
#[derive(Debug, Clone)]
pub struct SessionStore {
    memory: Arc<RwLock<HashMap<i64, MemoryEntry>>>,
    redis: Option<Arc<RedisSessionBackend>>,
    key_prefix: String,
    ttl: Duration,
}

impl SessionStore {
    /// Create an in-process store (no Redis)
    #[must_use]
    pub fn in_memory(ttl: Duration) -> Self {
        Self {
            memory: Arc::new(RwLock::new(HashMap::new())),
            redis: None,
            key_prefix: "session".to_string(),
            ttl,
        }
    }

    /// Create a store from configuration, selecting the Redis backend when a
    /// URL is present
    ///
    /// # Errors
    ///
    /// Returns error if the Redis URL is invalid
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let redis = match config.redis_url.as_deref() {
            Some(url) => {
                let backend = RedisSessionBackend::new(url)?;
                tracing::info!(key_prefix = %config.key_prefix, ttl_secs = config.ttl.as_secs(), "session store backend: redis");
                Some(Arc::new(backend))
            }
            None => {
                tracing::info!(ttl_secs = config.ttl.as_secs(), "session store backend: memory");
                None
            }
        };
        Ok(Self {
            memory: Arc::new(RwLock::new(HashMap::new())),
            redis,
            key_prefix: config.key_prefix.clone(),
            ttl: config.ttl,
        })
    }

    /// The configured expiration window
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn key(&self, chat_id: i64) -> String {
        format!("{}:{chat_id}", self.key_prefix)
    }

    /// Look up the session for a chat
    ///
    /// # Errors
    ///
    /// Returns error if the backing store is unreachable
    pub async fn get(&self, chat_id: i64) -> Result<SessionLookup> {
        let key = self.key(chat_id);

        let payload = if let Some(ref redis) = self.redis {
            redis.get(&key).await?
        } else {
            let guard = self.memory.read().await;
            guard
                .get(&chat_id)
                .filter(|entry| entry.expires_at > Instant::now())
                .map(|entry| entry.payload.clone())
        };

        let Some(payload) = payload else {
            return Ok(SessionLookup::Missing);
        };

        match serde_json::from_str::<Session>(&payload) {
            Ok(session) => Ok(SessionLookup::Found(session)),
            Err(error) => {
                tracing::warn!(chat_id, %error, "stored session payload is corrupt");
                Ok(SessionLookup::Corrupt)
            }
        }
    }

    /// Write the session for a chat, refreshing its expiration window
    ///
    /// # Errors
    ///
    /// Returns error if the session cannot be serialized or the backing
    /// store is unreachable
    pub async fn set(&self, chat_id: i64, session: &Session) -> Result<()> {
        let key = self.key(chat_id);
        let payload = serde_json::to_string(session)?;

        if let Some(ref redis) = self.redis {
            redis.set_ex(&key, &payload, self.ttl.as_secs()).await?;
        } else {
            let mut guard = self.memory.write().await;
            guard.insert(
                chat_id,
                MemoryEntry {
                    payload,
                    expires_at: Instant::now() + self.ttl,
                },
            );
        }

        tracing::debug!(chat_id, state = ?session.state, "session written");
        Ok(())
    }

    /// Inject a raw payload, bypassing serialization (corruption tests)
    #[cfg(test)]
    pub(crate) async fn set_raw(&self, chat_id: i64, payload: &str) {
        let mut guard = self.memory.write().await;
        guard.insert(
            chat_id,
            MemoryEntry {
                payload: payload.to_string(),
                expires_at: Instant::now() + self.ttl,
            },
        );
    }
}
