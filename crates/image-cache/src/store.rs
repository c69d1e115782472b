//! Backing storage for cached images

use crate::error::Result;
use crate::types::{CachedImage, CachedImageEntry};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Key/value storage for cached images.
///
/// Keys are opaque, filesystem-safe strings chosen by the cache. `put`
/// replaces any existing value under the same key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Metadata and blob for `key`
    async fn get(&self, key: &str) -> Result<Option<CachedImage>>;
    /// Metadata only, without loading the blob
    async fn entry(&self, key: &str) -> Result<Option<CachedImageEntry>>;
    async fn put(&self, key: &str, image: &CachedImage) -> Result<()>;
    /// Returns whether anything was removed
    async fn remove(&self, key: &str) -> Result<bool>;
    /// Every key holding data, including partially written entries
    async fn keys(&self) -> Result<Vec<String>>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CachedImage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<CachedImage>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn entry(&self, key: &str) -> Result<Option<CachedImageEntry>> {
        Ok(self.entries.read().await.get(key).map(|i| i.entry.clone()))
    }

    async fn put(&self, key: &str, image: &CachedImage) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), image.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

/// On-disk store: one `<key>.bin` blob and one `<key>.json` metadata file per
/// entry. The metadata file is written last and is what makes an entry visible.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Ensure the cache directory exists
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        info!(cache_dir = ?self.dir, "Image cache directory ready");
        Ok(())
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", key))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn remove_optional(path: &Path) -> Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl CacheStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<CachedImage>> {
        let Some(entry) = self.entry(key).await? else {
            return Ok(None);
        };
        match read_optional(&self.blob_path(key)).await? {
            Some(data) => Ok(Some(CachedImage {
                entry,
                data: data.into(),
            })),
            None => {
                debug!(key, "Blob missing for cached metadata");
                Ok(None)
            }
        }
    }

    async fn entry(&self, key: &str) -> Result<Option<CachedImageEntry>> {
        match read_optional(&self.meta_path(key)).await? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, image: &CachedImage) -> Result<()> {
        fs::write(self.blob_path(key), &image.data).await?;
        let meta = serde_json::to_vec(&image.entry)?;
        fs::write(self.meta_path(key), meta).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let had_meta = remove_optional(&self.meta_path(key)).await?;
        let had_blob = remove_optional(&self.blob_path(key)).await?;
        Ok(had_meta || had_blob)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys = BTreeSet::new();
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if !matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("json") | Some("bin")
            ) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.insert(stem.to_string());
            }
        }
        Ok(keys.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    fn image(source_id: &str, data: &'static [u8]) -> CachedImage {
        let now = Utc::now();
        CachedImage {
            entry: CachedImageEntry {
                source_id: source_id.to_string(),
                content_type: "image/png".to_string(),
                size: data.len() as u64,
                stored_at: now,
                expires_at: now + Duration::hours(1),
            },
            data: bytes::Bytes::from_static(data),
        }
    }

    #[tokio::test]
    async fn test_memory_store_put_get_remove() {
        let store = MemoryStore::new();
        store.put("k1", &image("abc", b"png!")).await.unwrap();

        let cached = store.get("k1").await.unwrap().unwrap();
        assert_eq!(cached.data.as_ref(), b"png!");
        assert_eq!(store.keys().await.unwrap(), vec!["k1".to_string()]);

        assert!(store.remove("k1").await.unwrap());
        assert!(!store.remove("k1").await.unwrap());
        assert!(store.get("k1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_put_get_remove() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("images"));
        store.init().await.unwrap();

        store.put("k1", &image("abc", b"png!")).await.unwrap();

        let cached = store.get("k1").await.unwrap().unwrap();
        assert_eq!(cached.data.as_ref(), b"png!");
        assert_eq!(cached.entry.source_id, "abc");
        assert_eq!(store.keys().await.unwrap(), vec!["k1".to_string()]);

        assert!(store.remove("k1").await.unwrap());
        assert!(store.get("k1").await.unwrap().is_none());
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_put_overwrites() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.init().await.unwrap();

        store.put("k1", &image("abc", b"old")).await.unwrap();
        store.put("k1", &image("abc", b"newer")).await.unwrap();

        let cached = store.get("k1").await.unwrap().unwrap();
        assert_eq!(cached.data.as_ref(), b"newer");
        assert_eq!(store.keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_file_store_corrupt_metadata_is_an_error() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.init().await.unwrap();
        fs::write(dir.path().join("broken.json"), b"{not json")
            .await
            .unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["broken".to_string()]);
        assert!(store.entry("broken").await.is_err());
    }

    #[tokio::test]
    async fn test_file_store_lists_blob_without_metadata() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.init().await.unwrap();
        fs::write(dir.path().join("orphan.bin"), b"png!").await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["orphan".to_string()]);
        assert!(store.entry("orphan").await.unwrap().is_none());
        assert!(store.remove("orphan").await.unwrap());
        assert!(!dir.path().join("orphan.bin").exists());
    }

    #[tokio::test]
    async fn test_file_store_missing_dir_has_no_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("never-created"));
        assert!(store.keys().await.unwrap().is_empty());
    }
}
