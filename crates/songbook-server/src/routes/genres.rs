use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use songbook_db::GenreRow;
use tracing::info;
use ts_rs::TS;

use super::JsonBody;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GenreRequest {
    id: Option<String>,
    name: Option<String>,
}

impl GenreRequest {
    fn into_fields(self) -> Result<(String, String), AppError> {
        let id = self.id.filter(|s| !s.trim().is_empty());
        let name = self.name.filter(|s| !s.trim().is_empty());
        match (id, name) {
            (Some(id), Some(name)) => Ok((id, name)),
            _ => Err(AppError::BadRequest("Both id and name are required".into())),
        }
    }
}

#[derive(Deserialize)]
pub struct DeleteParams {
    id: Option<String>,
}

pub async fn list_genres(State(state): State<AppState>) -> Result<Json<Vec<GenreRow>>, AppError> {
    Ok(Json(songbook_db::genres::list(&state.pool).await?))
}

pub async fn create_genre(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<GenreRequest>,
) -> Result<Json<GenreRow>, AppError> {
    let (id, name) = body.into_fields()?;

    let genre = songbook_db::genres::create(&state.pool, &id, &name)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("Genre already exists: {id}")))?;

    info!(id = %genre.id, "Genre created");
    Ok(Json(genre))
}

pub async fn update_genre(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<GenreRequest>,
) -> Result<Json<GenreRow>, AppError> {
    let (id, name) = body.into_fields()?;

    let genre = songbook_db::genres::update(&state.pool, &id, &name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Genre not found: {id}")))?;

    Ok(Json(genre))
}

/// DELETE /api/genres?id=
pub async fn delete_genre_by_query(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<Value>, AppError> {
    delete(&state, params.id).await
}

/// DELETE /api/genres/{id}
pub async fn delete_genre(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    delete(&state, Some(id)).await
}

/// DELETE /api/genres/ with an empty id segment
pub async fn delete_genre_missing_id() -> AppError {
    AppError::BadRequest("Genre id is required".into())
}

async fn delete(state: &AppState, id: Option<String>) -> Result<Json<Value>, AppError> {
    let id = id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Genre id is required".into()))?;

    if !songbook_db::genres::delete(&state.pool, &id).await? {
        return Err(AppError::NotFound(format!("Genre not found: {id}")));
    }

    info!(id = %id, "Genre deleted");
    Ok(Json(json!({ "message": "Genre deleted" })))
}
