//! Redis-backed session store

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

use super::session::SessionStore;

#[derive(Clone)]
pub struct RedisService {
    client: Client,
    /// Session lifetime, refreshed on every write
    ttl_seconds: u64,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client, ttl_seconds })
    }

    fn key(session_id: &str, name: &str) -> String {
        format!("session:{}:{}", session_id, name)
    }

    /// Get a Redis connection
    pub async fn get_connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl SessionStore for RedisService {
    async fn get(&self, session_id: &str, key: &str) -> AppResult<i64> {
        let mut conn = self.get_connection().await?;

        let value: Option<i64> = conn
            .get(Self::key(session_id, key))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read session value: {}", e)))?;

        Ok(value.unwrap_or(0))
    }

    async fn increment(&self, session_id: &str, key: &str) -> AppResult<i64> {
        let mut conn = self.get_connection().await?;
        let key = Self::key(session_id, key);

        let (value,): (i64,) = redis::pipe()
            .atomic()
            .incr(&key, 1)
            .expire(&key, self.ttl_seconds as i64)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to update session value: {}", e)))?;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(
            RedisService::key("0b8a", "num_visits"),
            "session:0b8a:num_visits"
        );
    }
}
