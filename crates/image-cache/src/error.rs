//! Error types for the image cache

use std::fmt;

#[derive(Debug)]
pub enum CacheError {
    Io(Box<std::io::Error>),
    /// Metadata could not be encoded or decoded
    Serialization(serde_json::Error),
    Http(Box<reqwest::Error>),
    /// The image source answered but did not produce an image
    Fetch { status: u16, message: String },
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Io(err) => write!(f, "IO error: {}", err),
            CacheError::Serialization(err) => write!(f, "Metadata error: {}", err),
            CacheError::Http(err) => write!(f, "HTTP error: {}", err),
            CacheError::Fetch { status, message } => {
                write!(f, "Image fetch failed with status {}: {}", status, message)
            }
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io(err) => Some(err.as_ref()),
            CacheError::Serialization(err) => Some(err),
            CacheError::Http(err) => Some(err.as_ref()),
            CacheError::Fetch { .. } => None,
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Io(Box::new(err))
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err)
    }
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        CacheError::Http(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
