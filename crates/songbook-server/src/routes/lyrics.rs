use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::ErrorKind;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

const MAX_ORDER_LEN: usize = 64;

#[derive(Deserialize)]
pub struct LyricsParams {
    order: Option<String>,
}

/// Lyric file stems are song orders like `12` or `3-1`. Anything that could
/// name another path is rejected.
fn valid_order(order: &str) -> bool {
    !order.is_empty()
        && order.len() <= MAX_ORDER_LEN
        && order
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// GET /api/lyrics?order={n}
pub async fn get_lyrics(
    State(state): State<AppState>,
    Query(params): Query<LyricsParams>,
) -> Result<Json<Value>, AppError> {
    let order = params
        .order
        .ok_or_else(|| AppError::BadRequest("Order parameter is required".into()))?;

    if !valid_order(&order) {
        return Err(AppError::BadRequest("Invalid order parameter".into()));
    }

    let path = state.lyrics_dir.join(format!("{order}.txt"));
    match tokio::fs::read_to_string(&path).await {
        Ok(lyrics) => Ok(Json(json!({ "lyrics": lyrics }))),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(AppError::NotFound("Lyrics not found".into()))
        }
        Err(e) => {
            warn!(order = %order, error = %e, "Failed to read lyrics");
            Err(AppError::NotFound("Lyrics not found".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_order() {
        assert!(valid_order("12"));
        assert!(valid_order("3-1"));
        assert!(valid_order("intro_2"));

        assert!(!valid_order(""));
        assert!(!valid_order("../secrets"));
        assert!(!valid_order("a/b"));
        assert!(!valid_order("12.txt"));
        assert!(!valid_order(&"9".repeat(65)));
    }
}
