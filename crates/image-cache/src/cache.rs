//! TTL cache over a [`CacheStore`], filled from an [`ImageSource`]

use crate::error::Result;
use crate::source::{source_id_for, ImageSource};
use crate::store::CacheStore;
use crate::types::{CacheStats, CachedImage, CachedImageEntry};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ImageCache {
    store: Arc<dyn CacheStore>,
    source: Arc<dyn ImageSource>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ImageCache {
    /// Seven days, matching how long cover art stays cached in the browser
    pub const DEFAULT_TTL_SECS: i64 = 7 * 24 * 60 * 60;

    /// Create a cache without sweeping. Prefer [`ImageCache::open`] at startup.
    pub fn new(store: Arc<dyn CacheStore>, source: Arc<dyn ImageSource>, ttl: Duration) -> Self {
        Self {
            store,
            source,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Create a cache and purge expired entries before any image is requested
    pub async fn open(
        store: Arc<dyn CacheStore>,
        source: Arc<dyn ImageSource>,
        ttl: Duration,
    ) -> Result<Self> {
        let cache = Self::new(store, source, ttl);
        let removed = cache.cleanup_expired_entries().await?;
        info!(removed, ttl_secs = ttl.num_seconds(), "Image cache opened");
        Ok(cache)
    }

    /// Storage key for a source id
    pub fn cache_key(source_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source_id.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Remove every expired entry, every entry whose metadata cannot be read,
    /// and blobs left without metadata by an interrupted write. Returns how
    /// many were removed. Safe to call repeatedly.
    pub async fn cleanup_expired_entries(&self) -> Result<usize> {
        let now = Utc::now();
        let mut removed = 0;

        for key in self.store.keys().await? {
            let expired = match self.store.entry(&key).await {
                Ok(Some(entry)) => entry.is_expired_at(now),
                Ok(None) => {
                    debug!(key = %key, "Removing blob without metadata");
                    true
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Unreadable cache entry, removing");
                    true
                }
            };
            if expired && self.store.remove(&key).await? {
                debug!(key = %key, "Removed expired cache entry");
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Return the cached image if present and unexpired, otherwise fetch it,
    /// store it with a fresh expiry and return it.
    ///
    /// `link` may be a bare source id or an image URL. Every link form of one
    /// Drive file resolves to the same entry.
    pub async fn get_or_fetch(&self, link: &str) -> Result<CachedImage> {
        let source_id = source_id_for(link);
        let source_id = source_id.as_str();
        let key = Self::cache_key(source_id);
        let now = Utc::now();

        match self.store.get(&key).await {
            Ok(Some(image)) if !image.entry.is_expired_at(now) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(source_id, "Image cache hit");
                return Ok(image);
            }
            Ok(Some(_)) => {
                debug!(source_id, "Image cache entry expired");
                self.store.remove(&key).await?;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(source_id, error = %e, "Unreadable cache entry, refetching");
                self.store.remove(&key).await?;
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let fetched = self.source.fetch(source_id).await.map_err(|e| {
            warn!(source_id, error = %e, "Image fetch failed");
            e
        })?;

        let stored_at = Utc::now();
        let image = CachedImage {
            entry: CachedImageEntry {
                source_id: source_id.to_string(),
                content_type: fetched.content_type,
                size: fetched.data.len() as u64,
                stored_at,
                expires_at: stored_at + self.ttl,
            },
            data: fetched.data,
        };

        // Continue even if caching fails
        if let Err(e) = self.store.put(&key, &image).await {
            warn!(source_id, error = %e, "Failed to cache image");
        }

        Ok(image)
    }

    /// Drop one entry. Returns whether it was cached.
    pub async fn evict(&self, link: &str) -> Result<bool> {
        self.store
            .remove(&Self::cache_key(&source_id_for(link)))
            .await
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        let mut entries = 0;
        let mut total_size = 0;
        for key in self.store.keys().await? {
            if let Ok(Some(entry)) = self.store.entry(&key).await {
                entries += 1;
                total_size += entry.size;
            }
        }
        Ok(CacheStats {
            entries,
            total_size,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        })
    }
}
