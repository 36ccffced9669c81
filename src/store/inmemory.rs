//! In-memory string store (default, thread-safe, async).
//!
//! Uses DashMap for lock-free concurrent access with per-key sharding.
//! This is the demo-grade backend: contents live for the lifetime of the
//! process and are lost on exit.

use super::StringStore;
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe async in-memory string store.
///
/// Cloning is cheap and clones share the same underlying map, so one
/// store can back every repository in a service.
///
/// # Example
///
/// ```no_run
/// use crm_kit::store::{InMemoryStore, StringStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStore::new();
///
///     store.set("customers_demo-user", "[]".to_string()).await?;
///     let blob = store.get("customers_demo-user").await?;
///     assert_eq!(blob.as_deref(), Some("[]"));
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct InMemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        InMemoryStore {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Get the current number of keys in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every key. Affects all users sharing this store.
    pub fn clear_all(&self) {
        self.entries.clear();
        warn!("InMemory CLEAR_ALL executed - all collections dropped");
    }

    /// Total bytes held across all blobs, for diagnostics.
    pub fn total_bytes(&self) -> usize {
        self.entries.iter().map(|entry| entry.value().len()).sum()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StringStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.entries.get(key).map(|e| e.value().clone());
        if value.is_some() {
            debug!("InMemory GET {} -> present", key);
        } else {
            debug!("InMemory GET {} -> absent", key);
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        debug!("InMemory SET {} ({} bytes)", key, value.len());
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        debug!("InMemory REMOVE {}", key);
        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.entries.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_inmemory_set_get() {
        let store = InMemoryStore::new();

        store
            .set("key1", "value1".to_string())
            .await
            .expect("Failed to set");

        let result = store.get("key1").await.expect("Failed to get");
        assert_eq!(result, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_inmemory_miss() {
        let store = InMemoryStore::new();

        let result = store.get("nonexistent").await.expect("Failed to get");
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_inmemory_overwrite() {
        let store = InMemoryStore::new();

        store
            .set("key1", "old".to_string())
            .await
            .expect("Failed to set");
        store
            .set("key1", "new".to_string())
            .await
            .expect("Failed to set");

        let result = store.get("key1").await.expect("Failed to get");
        assert_eq!(result, Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_inmemory_remove() {
        let store = InMemoryStore::new();

        store
            .set("key1", "value1".to_string())
            .await
            .expect("Failed to set");
        assert!(store.contains("key1").await.expect("Failed to check"));

        store.remove("key1").await.expect("Failed to remove");
        assert!(!store.contains("key1").await.expect("Failed to check"));

        // Removing again is a no-op, not an error
        store.remove("key1").await.expect("Failed to remove twice");
    }

    #[tokio::test]
    async fn test_inmemory_clear_all() {
        let store = InMemoryStore::new();

        store
            .set("key1", "a".to_string())
            .await
            .expect("Failed to set");
        store
            .set("key2", "b".to_string())
            .await
            .expect("Failed to set");
        assert_eq!(store.len(), 2);

        store.clear_all();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_inmemory_clone_shares_state() {
        let store1 = InMemoryStore::new();
        store1
            .set("key", "value".to_string())
            .await
            .expect("Failed to set");

        let store2 = store1.clone();

        let value = store2.get("key").await.expect("Failed to get");
        assert_eq!(value, Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_inmemory_thread_safe() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryStore::new());
        let mut handles = vec![];

        for i in 0..10 {
            let store_clone = Arc::clone(&store);
            let handle = tokio::spawn(async move {
                let key = format!("key_{}", i);
                let value = format!("value_{}", i);
                store_clone
                    .set(&key, value)
                    .await
                    .expect("Failed to set");
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.await.expect("Task failed");
        }

        assert_eq!(store.len(), 10);
    }
}
