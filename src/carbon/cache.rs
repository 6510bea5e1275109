use crate::domain::reading::CarbonReading;
use anyhow::Result;
use redis::AsyncCommands;
use std::time::Duration;

/// Best-effort reading cache. Implementations must never fail the caller:
/// a broken backend degrades to a miss on read and a no-op on write.
#[async_trait::async_trait]
pub trait ReadingCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<CarbonReading>;
    async fn put(&self, key: &str, reading: &CarbonReading, ttl: Duration);
}

pub struct RedisReadingCache {
    pub client: redis::Client,
}

impl RedisReadingCache {
    pub fn new(redis_url: &str) -> Result<Self> {
        Ok(Self {
            client: redis::Client::open(redis_url)?,
        })
    }

    async fn read(&self, key: &str) -> Result<Option<CarbonReading>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(key).await?;
        match payload {
            Some(p) => Ok(Some(serde_json::from_str(&p)?)),
            None => Ok(None),
        }
    }

    async fn write(&self, key: &str, reading: &CarbonReading, ttl: Duration) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(reading)?;
        let _: () = conn.set_ex(key, payload, ttl.as_secs()).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ReadingCache for RedisReadingCache {
    async fn get(&self, key: &str) -> Option<CarbonReading> {
        match self.read(key).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed");
                None
            }
        }
    }

    async fn put(&self, key: &str, reading: &CarbonReading, ttl: Duration) {
        if let Err(e) = self.write(key, reading, ttl).await {
            tracing::warn!(key, error = %e, "cache write failed");
        }
    }
}
