//! Google OAuth and Drive API types

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::fmt;

/// A short-lived OAuth access token
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: String, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// True while the token stays valid for at least `margin` longer
    pub fn is_fresh(&self, margin: Duration) -> bool {
        Utc::now() + margin < self.expires_at
    }
}

// The token value is a credential and stays out of logs.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Successful response from the OAuth token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Present only when the provider rotates the refresh credential
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    pub token_type: Option<String>,
}

/// Error body from the OAuth token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Subset of a Drive `files.get` metadata response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Drive reports sizes as decimal strings
    #[serde(default)]
    pub size: Option<String>,
}

impl FileMetadata {
    pub fn content_type(&self) -> &str {
        self.mime_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }

    pub fn is_image(&self) -> bool {
        self.content_type().starts_with("image/")
    }

    pub fn is_audio(&self) -> bool {
        self.content_type().starts_with("audio/")
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_deref().and_then(|s| s.parse().ok())
    }
}

/// A fully downloaded image
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub data: Bytes,
    pub content_type: String,
}

/// An inclusive byte range within a file of known size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl ByteRange {
    /// Parse a `Range: bytes=start-end` header against a file of `total` bytes.
    ///
    /// A missing end means "to the end of the file". Ranges that fall outside the
    /// file, or suffix ranges (`bytes=-500`), yield `None` and the caller serves
    /// the whole file instead.
    pub fn parse(header: &str, total: u64) -> Option<ByteRange> {
        let bounds = header.trim().strip_prefix("bytes=")?;
        let (start, end) = bounds.split_once('-')?;
        let start: u64 = start.trim().parse().ok()?;
        let end: u64 = match end.trim() {
            "" => total.checked_sub(1)?,
            e => e.parse().ok()?,
        };
        if start > end || end >= total {
            return None;
        }
        Some(ByteRange { start, end, total })
    }

    pub fn byte_count(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for the upstream `Range` request header
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }

    /// Value for the `Content-Range` response header
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// A streaming download, possibly partial
#[derive(Debug)]
pub struct MediaStream {
    pub metadata: FileMetadata,
    pub range: Option<ByteRange>,
    pub response: reqwest::Response,
}

impl MediaStream {
    pub fn content_length(&self) -> Option<u64> {
        match self.range {
            Some(range) => Some(range.byte_count()),
            None => self.metadata.size_bytes(),
        }
    }

    pub fn into_bytes_stream(
        self,
    ) -> impl futures::Stream<Item = std::result::Result<Bytes, reqwest::Error>> {
        self.response.bytes_stream()
    }
}
