//! String key-value store backends.
//!
//! Everything the datastore persists is a UTF-8 blob under a flat string
//! key. Collections are whole-blob values: a read returns the entire
//! serialized collection, a write replaces it. There are no partial or
//! merge semantics at this layer.

use crate::error::Result;

pub mod file;
pub mod inmemory;

pub use file::FileStore;
pub use inmemory::InMemoryStore;

/// Trait for string key-value store implementations.
///
/// Abstracts the flat blob store underneath the repositories, allowing
/// swappable backends. Implementations: InMemory (default), file-backed,
/// or anything else that can hold strings under string keys.
///
/// **IMPORTANT:** All methods use `&self` instead of `&mut self` to allow
/// concurrent access. Backend implementations should use interior
/// mutability (DashMap, RwLock, or external storage).
///
/// A well-formed read never fails: `get` on an absent key is `Ok(None)`,
/// not an error. Only genuine environment failures (I/O) surface as `Err`.
#[allow(async_fn_in_trait)]
pub trait StringStore: Send + Sync + Clone {
    /// Retrieve the blob stored under `key`.
    ///
    /// # Returns
    /// - `Ok(Some(blob))` - Value present
    /// - `Ok(None)` - Key never written (not an error)
    ///
    /// # Errors
    /// Returns `Err` if the backing store is unavailable
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous blob.
    ///
    /// # Errors
    /// Returns `Err` if the backing store is unavailable
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Remove the blob stored under `key`. Removing an absent key is a
    /// no-op.
    ///
    /// # Errors
    /// Returns `Err` if the backing store is unavailable
    async fn remove(&self, key: &str) -> Result<()>;

    /// Check whether `key` holds a value (optional optimization).
    ///
    /// # Errors
    /// Returns `Err` if the backing store is unavailable
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
