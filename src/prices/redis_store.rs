//! External cache tier backed by Redis.

use std::time::Duration;

use anyhow::Result;
use redis::AsyncCommands;

use super::cache::CacheStore;

pub struct RedisStore {
    conn: redis::aio::MultiplexedConnection,
}

impl RedisStore {
    /// Open and verify a connection. This runs once at service start; an
    /// error here downgrades the cache to its in-process tier for the rest
    /// of the process lifetime.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<f64>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        // A value that does not parse as a number was not written by us;
        // treat it as a miss.
        Ok(value.and_then(|v| v.parse().ok()))
    }

    async fn set_ex(&self, key: &str, value: f64, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let () = conn
            .set_ex(key, value.to_string(), ttl.as_secs().max(1))
            .await?;
        Ok(())
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.keys(format!("{prefix}*")).await?;
        if !keys.is_empty() {
            let () = conn.del(keys).await?;
        }
        Ok(())
    }
}
