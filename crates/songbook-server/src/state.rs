use chrono::{DateTime, Utc};
use drive_client::DriveClient;
use sqlx::postgres::PgPool;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub drive: Arc<DriveClient>,
    /// Directory of `{order}.txt` lyric files
    pub lyrics_dir: PathBuf,
    /// JSON file holding the display order of song ids
    pub song_order_path: PathBuf,
    pub started_at: DateTime<Utc>,
}
