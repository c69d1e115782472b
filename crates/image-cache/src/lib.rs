//! Image cache with TTL expiration
//!
//! Stores previously fetched images in a pluggable [`CacheStore`] (in memory
//! or on disk) and sweeps expired entries once when the cache is opened.

mod cache;
mod error;
mod source;
mod store;
mod types;

pub use cache::ImageCache;
pub use error::{CacheError, Result};
pub use source::{drive_file_id, proxied_path, source_id_for, ImageSource, ProxyImageSource};
pub use store::{CacheStore, FileStore, MemoryStore};
pub use types::{CacheStats, CachedImage, CachedImageEntry, FetchedImage};
