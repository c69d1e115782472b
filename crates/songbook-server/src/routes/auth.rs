use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info};

use crate::state::AppState;

/// GET /api/auth/refresh
/// Forces a new access token regardless of the cached one.
pub async fn refresh(State(state): State<AppState>) -> Response {
    match state.drive.tokens().refresh().await {
        Ok(token) => {
            info!(expires_at = %token.expires_at, "Access token refreshed on request");
            Json(json!({ "success": true })).into_response()
        }
        Err(e) => {
            error!(error = %e, "Token refresh failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Token refresh failed" })),
            )
                .into_response()
        }
    }
}
