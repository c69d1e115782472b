use axum::extract::{Path, State};
use axum::Json;
use songbook_db::ChapterWithSongs;

use super::parse_id;
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/chapters/{id}
pub async fn get_chapter(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ChapterWithSongs>, AppError> {
    let id = parse_id(&id, "chapter")?;
    let chapter = songbook_db::chapters::get_with_songs(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chapter not found".into()))?;
    Ok(Json(chapter))
}
