use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{FlowError, Result};

/// Context for sharing data between tasks in a graph execution
#[derive(Clone, Debug)]
pub struct Context {
    data: Arc<DashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: impl serde::Serialize) -> Result<()> {
        let key = key.into();
        let value = serde_json::to_value(value)
            .map_err(|e| FlowError::ContextError(format!("cannot serialize '{key}': {e}")))?;
        self.data.insert(key, value);
        Ok(())
    }

    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_sync(key)
    }

    /// Synchronous read, usable from edge conditions and non-async helpers.
    pub fn get_sync<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Typed read that reports a missing key as a [`FlowError::ContextError`].
    pub async fn require<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.get_sync(key)
            .ok_or_else(|| FlowError::ContextError(format!("'{key}' not found in context")))
    }

    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.data.remove(key).map(|(_, v)| v)
    }

    pub async fn clear(&self) {
        self.data.clear();
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
