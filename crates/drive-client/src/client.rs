//! Drive file metadata and media downloads

use crate::error::{DriveError, Result};
use crate::token::TokenRefresher;
use crate::types::{AccessToken, ByteRange, FileMetadata, MediaFile, MediaStream};
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use tracing::{debug, warn};

const MIN_FILE_ID_LEN: usize = 25;
const MAX_FILE_ID_LEN: usize = 128;

/// Check that `file_id` looks like a Drive file id before anything touches the network
pub fn validate_file_id(file_id: &str) -> Result<()> {
    if file_id.len() < MIN_FILE_ID_LEN || file_id.len() > MAX_FILE_ID_LEN {
        return Err(DriveError::Validation(format!(
            "file id must be {}-{} characters",
            MIN_FILE_ID_LEN, MAX_FILE_ID_LEN
        )));
    }
    if !file_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(DriveError::Validation(
            "file id may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(())
}

/// Drive v3 client authenticated through a [`TokenRefresher`]
pub struct DriveClient {
    http: Client,
    api_base: String,
    tokens: Arc<TokenRefresher>,
}

impl DriveClient {
    pub const DEFAULT_API_BASE: &'static str = "https://www.googleapis.com/drive/v3";

    pub fn new(tokens: Arc<TokenRefresher>) -> Self {
        Self::with_api_base(tokens, Self::DEFAULT_API_BASE)
    }

    pub fn with_api_base(tokens: Arc<TokenRefresher>, api_base: &str) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenRefresher {
        &self.tokens
    }

    /// Fetch id, MIME type and size for a file
    pub async fn file_metadata(&self, file_id: &str) -> Result<FileMetadata> {
        validate_file_id(file_id)?;
        let url = format!(
            "{}/files/{}?fields=id,mimeType,size&supportsAllDrives=true",
            self.api_base, file_id
        );
        let response = self.authorized_get(file_id, &url, None).await?;
        Ok(response.json().await?)
    }

    /// Download an image file in full
    pub async fn fetch_image(&self, file_id: &str) -> Result<MediaFile> {
        let metadata = self.file_metadata(file_id).await?;
        if !metadata.is_image() {
            return Err(DriveError::Validation(format!(
                "file {} is not an image ({})",
                file_id,
                metadata.content_type()
            )));
        }

        let response = self
            .authorized_get(file_id, &self.media_url(file_id), None)
            .await?;
        let data = response.bytes().await?;
        debug!(file_id, size = data.len(), "Fetched image from Drive");

        Ok(MediaFile {
            data,
            content_type: metadata.content_type().to_string(),
        })
    }

    /// Stream an image or audio file. Audio honours an HTTP `Range` header so
    /// players can seek; anything else is streamed whole. The range is kept
    /// only when Drive answers 206, otherwise the full body follows.
    pub async fn fetch_media(&self, file_id: &str, range: Option<&str>) -> Result<MediaStream> {
        let metadata = self.file_metadata(file_id).await?;
        if !metadata.is_image() && !metadata.is_audio() {
            return Err(DriveError::Validation(format!(
                "unsupported file type: {}",
                metadata.content_type()
            )));
        }

        let range = match (metadata.is_audio(), range, metadata.size_bytes()) {
            (true, Some(header), Some(total)) => ByteRange::parse(header, total),
            _ => None,
        };

        let response = self
            .authorized_get(file_id, &self.media_url(file_id), range.as_ref())
            .await?;
        let range = range.filter(|_| response.status() == StatusCode::PARTIAL_CONTENT);
        if range.is_none() && response.status() == StatusCode::OK {
            debug!(file_id, "Drive ignored range, streaming whole file");
        }

        Ok(MediaStream {
            metadata,
            range,
            response,
        })
    }

    fn media_url(&self, file_id: &str) -> String {
        format!(
            "{}/files/{}?alt=media&acknowledgeAbuse=true&supportsAllDrives=true",
            self.api_base, file_id
        )
    }

    /// GET with a bearer token. A 401 drops the cached token, forces one
    /// refresh and retries once; the retry's outcome is final.
    async fn authorized_get(
        &self,
        file_id: &str,
        url: &str,
        range: Option<&ByteRange>,
    ) -> Result<Response> {
        let token = self.tokens.ensure_valid_token().await?;
        let mut response = self.send(url, &token, range).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(file_id, "Drive rejected access token, refreshing once");
            self.tokens.invalidate().await;
            let token = self.tokens.refresh().await?;
            response = self.send(url, &token, range).await?;
        }

        check_status(file_id, response).await
    }

    async fn send(
        &self,
        url: &str,
        token: &AccessToken,
        range: Option<&ByteRange>,
    ) -> Result<Response> {
        let mut request = self.http.get(url).bearer_auth(&token.value);
        if let Some(range) = range {
            request = request.header(reqwest::header::RANGE, range.header_value());
        }
        Ok(request.send().await?)
    }
}

async fn check_status(file_id: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::NOT_FOUND => Err(DriveError::NotFound(format!("file {}", file_id))),
        StatusCode::UNAUTHORIZED => Err(DriveError::Auth(
            "Drive rejected a freshly refreshed token".to_string(),
        )),
        _ => {
            let message = response
                .text()
                .await
                .ok()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            warn!(file_id, status = %status, "Drive request failed");
            Err(DriveError::Upstream {
                status: status.as_u16(),
                message,
            })
        }
    }
}
