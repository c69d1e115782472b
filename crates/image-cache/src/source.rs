//! Where cache misses are fetched from

use crate::error::{CacheError, Result};
use crate::types::FetchedImage;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Produces image bytes for a source id on a cache miss
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, source_id: &str) -> Result<FetchedImage>;
}

/// Extract the file id from a Google Drive link such as
/// `https://drive.google.com/uc?export=view&id=<id>`
pub fn drive_file_id(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    if url.host_str() != Some("drive.google.com") {
        return None;
    }
    url.query_pairs()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// The cache identity for an image link: Drive links collapse to their file id
/// so every URL form of the same file shares one entry.
pub fn source_id_for(link: &str) -> String {
    drive_file_id(link).unwrap_or_else(|| link.to_string())
}

/// Rewrite a Drive link to the server's image-proxy path; other links pass through
pub fn proxied_path(link: &str) -> String {
    match drive_file_id(link) {
        Some(id) => format!("/api/image-proxy?id={}", urlencoding::encode(&id)),
        None => link.to_string(),
    }
}

/// Fetches images through the songbook server's `/api/image-proxy` endpoint.
/// Source ids that are absolute http(s) URLs (other than Drive links) are
/// fetched directly.
pub struct ProxyImageSource {
    client: Client,
    base_url: String,
}

impl ProxyImageSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn request_url(&self, source_id: &str) -> String {
        let is_remote = source_id.starts_with("http://") || source_id.starts_with("https://");
        if is_remote && drive_file_id(source_id).is_none() {
            return source_id.to_string();
        }
        let id = drive_file_id(source_id).unwrap_or_else(|| source_id.to_string());
        format!(
            "{}/api/image-proxy?id={}",
            self.base_url,
            urlencoding::encode(&id)
        )
    }
}

#[async_trait]
impl ImageSource for ProxyImageSource {
    async fn fetch(&self, source_id: &str) -> Result<FetchedImage> {
        let url = self.request_url(source_id);
        debug!(url = %url, "Fetching image");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CacheError::Fetch {
                status: status.as_u16(),
                message,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = response.bytes().await?;

        Ok(FetchedImage { data, content_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;

    const DRIVE_ID: &str = "1AbCdEfGhIjKlMnOpQrStUvWxYz012345";

    #[test]
    fn test_drive_file_id() {
        let link = format!("https://drive.google.com/uc?export=view&id={}", DRIVE_ID);
        assert_eq!(drive_file_id(&link).as_deref(), Some(DRIVE_ID));

        let open_link = format!("https://drive.google.com/open?id={}&usp=sharing", DRIVE_ID);
        assert_eq!(drive_file_id(&open_link).as_deref(), Some(DRIVE_ID));

        assert_eq!(drive_file_id("https://example.com/cover.jpg?id=123"), None);
        assert_eq!(drive_file_id("https://drive.google.com/uc?export=view"), None);
        assert_eq!(drive_file_id("not a url"), None);
    }

    #[test]
    fn test_source_id_for() {
        let view = format!("https://drive.google.com/uc?export=view&id={}", DRIVE_ID);
        let open = format!("https://drive.google.com/open?id={}", DRIVE_ID);
        assert_eq!(source_id_for(&view), DRIVE_ID);
        assert_eq!(source_id_for(&view), source_id_for(&open));
        assert_eq!(
            source_id_for("https://example.com/cover.jpg"),
            "https://example.com/cover.jpg"
        );
    }

    #[test]
    fn test_proxied_path() {
        let link = format!("https://drive.google.com/uc?export=view&id={}", DRIVE_ID);
        assert_eq!(
            proxied_path(&link),
            format!("/api/image-proxy?id={}", DRIVE_ID)
        );
        assert_eq!(
            proxied_path("/images/default-cover.png"),
            "/images/default-cover.png"
        );
    }

    #[test]
    fn test_request_url() {
        let source = ProxyImageSource::new("http://localhost:3000/");
        assert_eq!(
            source.request_url(DRIVE_ID),
            format!("http://localhost:3000/api/image-proxy?id={}", DRIVE_ID)
        );
        assert_eq!(
            source.request_url(&format!("https://drive.google.com/uc?id={}", DRIVE_ID)),
            format!("http://localhost:3000/api/image-proxy?id={}", DRIVE_ID)
        );
        assert_eq!(
            source.request_url("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }

    async fn image_proxy(Query(params): Query<HashMap<String, String>>) -> axum::response::Response {
        match params.get("id").map(String::as_str) {
            Some(DRIVE_ID) => ([(header::CONTENT_TYPE, "image/webp")], b"RIFF".to_vec()).into_response(),
            _ => (StatusCode::NOT_FOUND, "Image not found").into_response(),
        }
    }

    async fn spawn_proxy() -> String {
        let router = Router::new().route("/api/image-proxy", get(image_proxy));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_proxy_source_fetch() {
        let base = spawn_proxy().await;
        let source = ProxyImageSource::new(&base);

        let image = source.fetch(DRIVE_ID).await.unwrap();
        assert_eq!(image.content_type, "image/webp");
        assert_eq!(image.data.as_ref(), b"RIFF");
    }

    #[tokio::test]
    async fn test_proxy_source_not_found() {
        let base = spawn_proxy().await;
        let source = ProxyImageSource::new(&base);

        let err = source.fetch("1MissingMissingMissingMissing00").await.unwrap_err();
        match err {
            CacheError::Fetch { status, .. } => assert_eq!(status, 404),
            other => panic!("expected fetch error, got {:?}", other),
        }
    }
}
