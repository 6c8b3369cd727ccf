//! Per-browser-session values (the index page visit counter)

use std::{collections::HashMap, sync::Arc, sync::Mutex};

use async_trait::async_trait;

use crate::error::{AppError, AppResult};

/// Session variable counting index page visits
pub const NUM_VISITS: &str = "num_visits";

/// Integer values keyed by session identity and name
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current value, 0 when absent
    async fn get(&self, session_id: &str, key: &str) -> AppResult<i64>;

    /// Add one and return the new value
    async fn increment(&self, session_id: &str, key: &str) -> AppResult<i64>;
}

/// Process-local store for tests and single-instance development
#[derive(Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<(String, String), i64>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &str, key: &str) -> AppResult<i64> {
        let values = self
            .values
            .lock()
            .map_err(|_| AppError::Internal("Session store lock poisoned".to_string()))?;
        Ok(values
            .get(&(session_id.to_string(), key.to_string()))
            .copied()
            .unwrap_or(0))
    }

    async fn increment(&self, session_id: &str, key: &str) -> AppResult<i64> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| AppError::Internal("Session store lock poisoned".to_string()))?;
        let value = values
            .entry((session_id.to_string(), key.to_string()))
            .or_insert(0);
        *value += 1;
        Ok(*value)
    }
}

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Count a visit and return how many visits preceded it
    pub async fn record_visit(&self, session_id: &str) -> AppResult<i64> {
        let visits = self.store.increment(session_id, NUM_VISITS).await?;
        Ok(visits - 1)
    }

    pub async fn visits(&self, session_id: &str) -> AppResult<i64> {
        self.store.get(session_id, NUM_VISITS).await
    }
}
