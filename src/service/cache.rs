use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands};
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::RedisConfig;

const RETRY_STEP_MS: u64 = 200;
const MAX_POOL_SIZE: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError>;
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    /// Returns whether the key existed.
    async fn del(&self, key: &str) -> Result<bool, CacheError>;
    async fn ping(&self) -> Result<(), CacheError>;
}

/// Fixed set of multiplexed connections handed out round-robin.
pub struct RedisPool {
    conns: Vec<MultiplexedConnection>,
    next: AtomicUsize,
}

fn pool_len(requested: usize) -> usize {
    requested.clamp(1, MAX_POOL_SIZE)
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(RETRY_STEP_MS * u64::from(attempt))
}

async fn connect_with_retry(
    client: &redis::Client,
    max_retries: u32,
) -> Result<MultiplexedConnection, CacheError> {
    let mut attempt = 0;
    loop {
        match client.get_multiplexed_async_connection().await {
            Ok(conn) => return Ok(conn),
            Err(err) if attempt < max_retries => {
                attempt += 1;
                warn!(attempt, max_retries, error = %err, "redis connect failed, retrying");
                sleep(backoff(attempt)).await;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

impl RedisPool {
    pub async fn connect(cfg: &RedisConfig) -> Result<Self, CacheError> {
        let client = redis::Client::open(cfg.url())?;
        let size = pool_len(cfg.pool_size);
        if size != cfg.pool_size {
            warn!(requested = cfg.pool_size, size, "REDIS_POOL_SIZE out of range, clamped");
        }
        let mut conns = Vec::with_capacity(size);
        for _ in 0..size {
            conns.push(connect_with_retry(&client, cfg.max_retries).await?);
        }
        info!(host = %cfg.host, port = %cfg.port, db = cfg.db, size, "redis pool ready");
        Ok(Self {
            conns,
            next: AtomicUsize::new(0),
        })
    }

    fn checkout(&self) -> MultiplexedConnection {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.conns.len();
        self.conns[idx].clone()
    }
}

#[async_trait]
impl CacheStore for RedisPool {
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        let mut conn = self.checkout();
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.checkout();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn del(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.checkout();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.checkout();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::{collections::HashMap, sync::Mutex};

    /// In-process stand-in used by service tests. TTLs are recorded, not enforced.
    #[derive(Default)]
    pub struct MemoryCache {
        entries: Mutex<HashMap<String, (String, u64)>>,
    }

    impl MemoryCache {
        pub fn ttl(&self, key: &str) -> Option<u64> {
            self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
        }

        pub fn len(&self) -> usize {
            self.entries.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CacheStore for MemoryCache {
        async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_string(), ttl_seconds));
            Ok(())
        }

        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .get(key)
                .map(|(value, _)| value.clone()))
        }

        async fn del(&self, key: &str) -> Result<bool, CacheError> {
            Ok(self.entries.lock().unwrap().remove(key).is_some())
        }

        async fn ping(&self) -> Result<(), CacheError> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_linearly() {
        assert_eq!(backoff(1), Duration::from_millis(200));
        assert_eq!(backoff(3), Duration::from_millis(600));
    }

    #[test]
    fn pool_len_is_clamped() {
        assert_eq!(pool_len(0), 1);
        assert_eq!(pool_len(10), 10);
        assert_eq!(pool_len(usize::MAX), MAX_POOL_SIZE);
    }

    #[tokio::test]
    async fn oversized_pool_fails_cleanly() {
        let cfg = RedisConfig {
            host: "127.0.0.1".to_string(),
            port: "1".to_string(),
            password: String::new(),
            db: 0,
            max_retries: 0,
            pool_size: usize::MAX,
        };
        assert!(matches!(
            RedisPool::connect(&cfg).await,
            Err(CacheError::Redis(_))
        ));
    }

    #[tokio::test]
    async fn connect_gives_up_after_retries() {
        let cfg = RedisConfig {
            host: "127.0.0.1".to_string(),
            port: "1".to_string(),
            password: String::new(),
            db: 0,
            max_retries: 0,
            pool_size: 1,
        };
        assert!(RedisPool::connect(&cfg).await.is_err());
    }
}
