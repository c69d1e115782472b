use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use songbook_db::SongRow;
use tracing::{error, info};
use ts_rs::TS;

use super::{parse_id, JsonBody};
use crate::error::AppError;
use crate::song_order;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

#[derive(Deserialize)]
pub struct ListParams {
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SongPage {
    songs: Vec<SongRow>,
    page: i64,
    limit: i64,
}

/// GET /api/songs?page=&limit=
pub async fn list_songs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<SongPage>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let offset = (page - 1)
        .checked_mul(limit)
        .ok_or_else(|| AppError::BadRequest("page is out of range".into()))?;

    let songs = songbook_db::songs::list(&state.pool, limit, offset).await?;

    Ok(Json(SongPage { songs, page, limit }))
}

pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SongRow>, AppError> {
    let id = parse_id(&id, "song")?;
    let song = songbook_db::songs::get(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Song not found".into()))?;
    Ok(Json(song))
}

#[derive(Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UpdateLyricsRequest {
    lyrics: Option<String>,
}

/// PUT /api/songs/{id}/lyrics
pub async fn update_lyrics(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateLyricsRequest>,
) -> Result<Json<SongRow>, AppError> {
    let id = parse_id(&id, "song")?;
    let lyrics = body
        .lyrics
        .ok_or_else(|| AppError::BadRequest("lyrics is required".into()))?;

    let song = songbook_db::songs::update_lyrics(&state.pool, id, &lyrics)
        .await?
        .ok_or_else(|| AppError::NotFound("Song not found".into()))?;

    info!(song_id = id, "Lyrics updated");
    Ok(Json(song))
}

/// PATCH /api/songs/{id}/toggle-new
/// Clears the "new" badge. It is never set back from here.
pub async fn toggle_new(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SongRow>, AppError> {
    let id = parse_id(&id, "song")?;
    let song = songbook_db::songs::clear_new_flag(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Song not found".into()))?;
    Ok(Json(song))
}

/// Song ids arrive as strings from the editor and as numbers from older clients
#[derive(Deserialize)]
#[serde(untagged)]
pub enum SongId {
    Text(String),
    Number(i64),
}

impl SongId {
    fn into_string(self) -> String {
        match self {
            SongId::Text(s) => s,
            SongId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
pub struct OrderedSong {
    id: SongId,
}

#[derive(Deserialize)]
pub struct ReorderRequest {
    songs: Option<Vec<OrderedSong>>,
}

/// POST /api/songs/reorder
pub async fn reorder(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ReorderRequest>,
) -> Result<Json<Value>, AppError> {
    let songs = body
        .songs
        .ok_or_else(|| AppError::BadRequest("songs is required".into()))?;
    let ids: Vec<String> = songs.into_iter().map(|s| s.id.into_string()).collect();

    song_order::write(&state.song_order_path, &ids)
        .await
        .map_err(|e| {
            error!(path = ?state.song_order_path, error = %e, "Failed to write song order");
            AppError::Internal("Failed to reorder songs".into())
        })?;

    info!(count = ids.len(), "Song order replaced");
    Ok(Json(json!({ "success": true })))
}
