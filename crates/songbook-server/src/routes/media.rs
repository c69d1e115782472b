use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;

const IMAGE_CACHE_CONTROL: &str = "public, max-age=86400";
const MEDIA_CACHE_CONTROL: &str = "public, max-age=31536000";

#[derive(Deserialize)]
pub struct ImageProxyParams {
    id: Option<String>,
}

/// GET /api/image-proxy?id=
/// Fetches a Drive image server-side so the browser never sees the provider
/// URL or the access token.
pub async fn image_proxy(
    State(state): State<AppState>,
    Query(params): Query<ImageProxyParams>,
) -> Result<Response, AppError> {
    let id = params
        .id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Image ID is required".into()))?;

    let image = state.drive.fetch_image(&id).await.map_err(|e| {
        warn!(file_id = %id, error = %e, "Image proxy failed");
        AppError::from(e)
    })?;

    debug!(file_id = %id, size = image.data.len(), "Image proxied");
    Ok((
        [
            (header::CONTENT_TYPE, image.content_type),
            (header::CACHE_CONTROL, IMAGE_CACHE_CONTROL.to_string()),
        ],
        image.data,
    )
        .into_response())
}

/// GET /api/proxy/{id}
/// Streams audio or images. Audio honours `Range` so players can seek.
pub async fn proxy_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());

    let media = state.drive.fetch_media(&id, range).await.map_err(|e| {
        warn!(file_id = %id, error = %e, "Media proxy failed");
        AppError::from(e)
    })?;

    let mut builder = Response::builder().header(header::CONTENT_TYPE, media.metadata.content_type());
    if media.metadata.is_audio() {
        builder = builder.header(header::ACCEPT_RANGES, "bytes");
    }
    if let Some(len) = media.content_length() {
        builder = builder.header(header::CONTENT_LENGTH, len);
    }
    builder = match media.range {
        Some(range) => builder
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_RANGE, range.content_range()),
        None => builder
            .status(StatusCode::OK)
            .header(header::CACHE_CONTROL, MEDIA_CACHE_CONTROL),
    };

    builder
        .body(Body::from_stream(media.into_bytes_stream()))
        .map_err(|e| AppError::Internal(format!("Failed to build media response: {e}")))
}
