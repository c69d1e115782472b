pub mod auth;
pub mod chapters;
pub mod config;
pub mod genres;
pub mod health;
pub mod lyrics;
pub mod media;
pub mod songs;

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json`, but a malformed body answers with the usual `{error}` shape
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Parse a numeric row id from a path segment
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<i32, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {what} id")))
}
