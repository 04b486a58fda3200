//! Redis-backed session persistence
//!
//! Lazy multiplexed connection with a single reconnect-and-retry per
//! command: a dropped connection is discarded and reopened once before the
//! error is surfaced.

use std::sync::Arc;

use redis::FromRedisValue;
use tokio::sync::Mutex;

use crate::{Error, Result};

#[derive(Debug)]
pub(crate) struct RedisSessionBackend {
    client: redis::Client,
    connection: Arc<Mutex<Option<redis::aio::MultiplexedConnection>>>,
}

impl RedisSessionBackend {
    pub(crate) fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::Session(format!("invalid redis url {url}: {e}")))?;
        Ok(Self {
            client,
            connection: Arc::new(Mutex::new(None)),
        })
    }

    async fn ensure_connection(
        &self,
        connection: &mut Option<redis::aio::MultiplexedConnection>,
    ) -> Result<()> {
        if connection.is_some() {
            return Ok(());
        }
        *connection = Some(
            self.client
                .get_multiplexed_async_connection()
                .await
                .map_err(|e| Error::Session(format!("redis connect failed: {e}")))?,
        );
        tracing::debug!("redis session backend connected");
        Ok(())
    }

    async fn run_command<T, F>(&self, operation: &'static str, build: F) -> Result<T>
    where
        T: FromRedisValue + Send,
        F: Fn() -> redis::Cmd,
    {
        let mut last_err: Option<Error> = None;
        for attempt in 0..2 {
            let mut conn_guard = self.connection.lock().await;
            self.ensure_connection(&mut conn_guard).await?;
            let conn = conn_guard
                .as_mut()
                .ok_or_else(|| Error::Session("redis connection unavailable".to_string()))?;
            let cmd = build();
            let result: redis::RedisResult<T> = cmd.query_async(conn).await;
            match result {
                Ok(value) => return Ok(value),
                Err(err) => {
                    tracing::warn!(
                        operation,
                        attempt = attempt + 1,
                        error = %err,
                        "redis command failed; reconnecting"
                    );
                    *conn_guard = None;
                    last_err = Some(Error::Session(format!("redis {operation} failed: {err}")));
                    if attempt == 0 {
                        continue;
                    }
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| Error::Session("redis command failed for unknown reason".to_string())))
    }

    /// Read the serialized payload stored under `key`
    pub(crate) async fn get(&self, key: &str) -> Result<Option<String>> {
        self.run_command::<Option<String>, _>("get", || {
            let mut cmd = redis::cmd("GET");
            cmd.arg(key);
            cmd
        })
        .await
    }

    /// Write `payload` under `key` with a fresh expiration window
    pub(crate) async fn set_ex(&self, key: &str, payload: &str, ttl_secs: u64) -> Result<()> {
        self.run_command::<(), _>("set", || {
            let mut cmd = redis::cmd("SET");
            cmd.arg(key).arg(payload).arg("EX").arg(ttl_secs);
            cmd
        })
        .await
    }
}
