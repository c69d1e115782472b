use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use songbook_db::{ConfigKey, ConfigRow};
use tracing::info;
use ts_rs::TS;

use super::JsonBody;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UpdateConfigRequest {
    key: Option<String>,
    value: Option<String>,
}

/// PATCH /api/config
/// Overwrites the value of an existing key. Keys are never created here, and
/// keys outside [`ConfigKey`] are unknown without asking the database.
pub async fn update_config(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UpdateConfigRequest>,
) -> Result<Json<ConfigRow>, AppError> {
    let key = body
        .key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("key is required".into()))?;
    let value = body
        .value
        .ok_or_else(|| AppError::BadRequest("value is required".into()))?;

    let key = ConfigKey::parse(&key)
        .ok_or_else(|| AppError::NotFound(format!("Unknown config key: {key}")))?;

    let row = songbook_db::config::update(&state.pool, key.as_str(), &value)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Config key not set: {}", key.as_str())))?;

    info!(key = %row.key, "Config updated");
    Ok(Json(row))
}
