//! Redis cache implementation.
//!
//! Provides a type-safe caching layer over a multiplexed connection, the
//! rate-limit counters used by the API, and the distributed lock that keeps
//! sentiment sweeps from overlapping across instances.

use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{
    Config, CACHE_PREFIX_ANALYSIS, CACHE_PREFIX_LOCK, CACHE_PREFIX_RATE_LIMIT,
    DEFAULT_CACHE_TTL_SECONDS,
};
use crate::domain::UserAnalysis;
use crate::errors::{AppError, AppResult};

/// Counts one request and opens the window on the first. A counter left
/// without a TTL gets one again instead of blocking its client forever.
const RATE_LIMIT_SCRIPT: &str = r#"
    local count = redis.call("INCR", KEYS[1])
    if count == 1 or redis.call("TTL", KEYS[1]) < 0 then
        redis.call("EXPIRE", KEYS[1], ARGV[1])
    end
    return count
"#;

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
    default_ttl: u64,
}

impl Cache {
    /// Connect to Redis through a reconnecting connection manager.
    pub async fn try_connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;
        tracing::info!("Redis cache connected");

        Ok(Self {
            connection,
            default_ttl: DEFAULT_CACHE_TTL_SECONDS,
        })
    }

    /// Round-trip a PING, used by the health check.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    // =========================================================================
    // Generic Cache Operations
    // =========================================================================

    /// Get a value from cache.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(cache_error)?;

        match value {
            Some(json) => {
                let parsed = serde_json::from_str(&json).map_err(|e| {
                    AppError::internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a value in cache with default TTL.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    /// Set a value in cache with custom TTL (in seconds).
    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Cache serialization error: {}", e)))?;

        conn.set_ex::<_, _, ()>(key, json, ttl_seconds)
            .await
            .map_err(cache_error)?;

        Ok(())
    }

    /// Delete a value from cache.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await.map_err(cache_error)?;
        Ok(())
    }

    // =========================================================================
    // Analysis Cache Operations
    // =========================================================================

    /// Get a cached analysis by ID.
    pub async fn get_analysis(&self, id: &Uuid) -> AppResult<Option<UserAnalysis>> {
        self.get(&analysis_key(id)).await
    }

    /// Cache a completed analysis.
    pub async fn set_analysis(&self, analysis: &UserAnalysis) -> AppResult<()> {
        self.set(&analysis_key(&analysis.id), analysis).await
    }

    /// Invalidate a cached analysis.
    pub async fn invalidate_analysis(&self, id: &Uuid) -> AppResult<()> {
        self.delete(&analysis_key(id)).await
    }

    // =========================================================================
    // Rate Limiting Operations
    // =========================================================================

    /// Check and increment rate limit counter.
    /// Returns (current_count, is_allowed) tuple.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        let count: i64 = redis::cmd("EVAL")
            .arg(RATE_LIMIT_SCRIPT)
            .arg(1)
            .arg(&key)
            .arg(window_seconds.max(1))
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        let count = count.max(0) as u64;

        Ok((count, count <= max_requests))
    }

    // =========================================================================
    // Distributed Lock Operations
    // =========================================================================

    /// Try to acquire a lock without retrying.
    /// Returns None if the lock is already held.
    pub async fn try_acquire_lock(
        &self,
        resource: &str,
        ttl_seconds: u64,
    ) -> AppResult<Option<LockGuard>> {
        let key = format!("{}{}", CACHE_PREFIX_LOCK, resource);
        let lock_id = Uuid::new_v4().to_string();
        let mut conn = self.connection.clone();

        let acquired: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(&lock_id)
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds.max(1))
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        if acquired.is_none() {
            return Ok(None);
        }

        tracing::debug!(resource = %resource, lock_id = %lock_id, "Lock acquired");
        Ok(Some(LockGuard {
            cache: Arc::new(self.clone()),
            key,
            lock_id,
            released: false,
        }))
    }

    /// Release a lock (internal use - prefer using LockGuard).
    async fn release_lock(&self, key: &str, lock_id: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();

        // Only delete if the lock_id matches (we own the lock)
        let script = r#"
            if redis.call("GET", KEYS[1]) == ARGV[1] then
                return redis.call("DEL", KEYS[1])
            else
                return 0
            end
        "#;

        let released: i32 = redis::cmd("EVAL")
            .arg(script)
            .arg(1)
            .arg(key)
            .arg(lock_id)
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(released == 1)
    }
}

fn analysis_key(id: &Uuid) -> String {
    format!("{}{}", CACHE_PREFIX_ANALYSIS, id)
}

// =============================================================================
// Lock Guard (RAII)
// =============================================================================

/// RAII guard for distributed locks.
/// Automatically releases the lock when dropped.
pub struct LockGuard {
    cache: Arc<Cache>,
    key: String,
    lock_id: String,
    released: bool,
}

impl LockGuard {
    /// Release the lock now instead of on drop.
    pub async fn release(mut self) -> AppResult<()> {
        self.released = true;
        if self.cache.release_lock(&self.key, &self.lock_id).await? {
            tracing::debug!(key = %self.key, "Lock released");
        }
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let cache = self.cache.clone();
        let key = std::mem::take(&mut self.key);
        let lock_id = std::mem::take(&mut self.lock_id);

        tokio::spawn(async move {
            if let Err(e) = cache.release_lock(&key, &lock_id).await {
                tracing::error!(key = %key, error = %e, "Failed to release lock on drop");
            } else {
                tracing::debug!(key = %key, "Lock released on drop");
            }
        });
    }
}

/// Convert Redis error to AppError.
fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}
