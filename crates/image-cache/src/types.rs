//! Cache types

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a cached image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedImageEntry {
    pub source_id: String,
    pub content_type: String,
    pub size: u64,
    pub stored_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CachedImageEntry {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A cached image: metadata plus the blob
#[derive(Debug, Clone)]
pub struct CachedImage {
    pub entry: CachedImageEntry,
    pub data: Bytes,
}

/// What an [`ImageSource`](crate::ImageSource) hands back on a miss
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub data: Bytes,
    pub content_type: String,
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_size: u64,
    pub hits: u64,
    pub misses: u64,
}
