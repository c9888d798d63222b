//! In-memory code → upstream URL store shared by the generator and the proxy.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("no audio cached for code {0}")]
    NotFound(String),
}

/// Retention policy for cached entries.
///
/// Only `Never` exists today: entries live for the lifetime of the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    #[default]
    Never,
}

/// Cheaply clonable handle; all clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct ResourceCache {
    entries: Arc<RwLock<HashMap<String, String>>>,
    policy: EvictionPolicy,
}

impl ResourceCache {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            policy,
        }
    }

    /// Insert or overwrite the URL stored under `code`.
    pub fn put(&self, code: impl Into<String>, url: impl Into<String>) {
        let code = code.into();
        let url = url.into();
        debug!("Caching {code} -> {url}");
        self.entries.write().insert(code, url);
    }

    pub fn get(&self, code: &str) -> Result<String, CacheError> {
        self.entries
            .read()
            .get(code)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(code.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }
}
