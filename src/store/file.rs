//! File-backed string store for durable local use.
//!
//! Holds the full key-value map in memory and writes the whole document
//! back to disk on every mutation. The on-disk form is a single JSON
//! object mapping keys to blobs, which keeps the file inspectable with
//! ordinary tools.
//!
//! Two processes pointing at the same path get last-write-wins with no
//! coordination; this backend is for single-process local persistence,
//! not shared storage.

use super::StringStore;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Durable string store persisted as one JSON document on disk.
///
/// Cloning shares state; all clones flush through the same map and file.
///
/// # Example
///
/// ```no_run
/// use crm_kit::store::{FileStore, StringStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStore::open("crm-data.json").await?;
///     store.set("events_demo-user", "[]".to_string()).await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl FileStore {
    /// Open a store at `path`, loading existing contents if the file is
    /// present. A missing file starts the store empty; it is created on
    /// the first write.
    ///
    /// # Errors
    /// Returns `Err` if the file exists but cannot be read or parsed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries: HashMap<String, String> = if path.exists() {
            let raw = tokio::fs::read_to_string(&path).await?;
            serde_json::from_str(&raw).map_err(|e| {
                error!("Store file {} is unreadable: {}", path.display(), e);
                Error::BackendError(format!(
                    "corrupt store file {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            HashMap::new()
        };

        debug!("FileStore OPEN {} ({} keys)", path.display(), entries.len());

        Ok(FileStore {
            path,
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    /// Path this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of keys currently held.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn flush(&self, entries: &HashMap<String, String>) -> Result<()> {
        let document = serde_json::to_string_pretty(entries)
            .map_err(|e| Error::SerializationError(e.to_string()))?;
        tokio::fs::write(&self.path, document).await?;
        Ok(())
    }
}

impl StringStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        debug!("File GET {}", key);
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self.entries.write().await;
        let previous = entries.insert(key.to_string(), value);

        // A failed flush must not leave the map ahead of the file.
        if let Err(e) = self.flush(&entries).await {
            match previous {
                Some(value) => entries.insert(key.to_string(), value),
                None => entries.remove(key),
            };
            return Err(e);
        }

        debug!("File SET {}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        if let Some(previous) = entries.remove(key) {
            if let Err(e) = self.flush(&entries).await {
                entries.insert(key.to_string(), previous);
                return Err(e);
            }
        }
        debug!("File REMOVE {}", key);
        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.entries.read().await.contains_key(key))
    }
}
