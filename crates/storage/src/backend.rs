use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::anyhow;

use crate::error::StorageResult;

/// Durable key/value storage for serialized state blobs.
///
/// Every `save` replaces the previous value for the key in full.
pub trait CartStorage: Send + Sync {
    fn load(&self, key: &str) -> StorageResult<Option<String>>;
    fn save(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<S> CartStorage for Arc<S>
where
    S: CartStorage + ?Sized,
{
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).save(key, value)
    }
}

/// In-memory storage for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    inner: RwLock<HashMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key (e.g. to simulate a blob left by a previous session).
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        if let Ok(mut map) = storage.inner.write() {
            map.insert(key.into(), value.into());
        }
        storage
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CartStorage for InMemoryStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let map = self.inner.read().map_err(|_| anyhow!("in-memory storage lock poisoned"))?;
        Ok(map.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut map = self.inner.write().map_err(|_| anyhow!("in-memory storage lock poisoned"))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
