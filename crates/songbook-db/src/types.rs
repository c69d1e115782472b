use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// Keys the config store recognizes. Stored as their string form in `app_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ConfigKey {
    #[serde(rename = "DATABASE_URL")]
    DatabaseUrl,
    #[serde(rename = "GOOGLE_DRIVE_CLIENT_ID")]
    GoogleDriveClientId,
    #[serde(rename = "GOOGLE_DRIVE_CLIENT_SECRET")]
    GoogleDriveClientSecret,
    #[serde(rename = "GOOGLE_DRIVE_REDIRECT_URI")]
    GoogleDriveRedirectUri,
    #[serde(rename = "GOOGLE_DRIVE_REFRESH_TOKEN")]
    GoogleDriveRefreshToken,
    #[serde(rename = "GEMINI_API_KEY")]
    GeminiApiKey,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::DatabaseUrl,
        ConfigKey::GoogleDriveClientId,
        ConfigKey::GoogleDriveClientSecret,
        ConfigKey::GoogleDriveRedirectUri,
        ConfigKey::GoogleDriveRefreshToken,
        ConfigKey::GeminiApiKey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::DatabaseUrl => "DATABASE_URL",
            ConfigKey::GoogleDriveClientId => "GOOGLE_DRIVE_CLIENT_ID",
            ConfigKey::GoogleDriveClientSecret => "GOOGLE_DRIVE_CLIENT_SECRET",
            ConfigKey::GoogleDriveRedirectUri => "GOOGLE_DRIVE_REDIRECT_URI",
            ConfigKey::GoogleDriveRefreshToken => "GOOGLE_DRIVE_REFRESH_TOKEN",
            ConfigKey::GeminiApiKey => "GEMINI_API_KEY",
        }
    }

    pub fn parse(key: &str) -> Option<ConfigKey> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

/// A single `app_config` row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConfigRow {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GenreRow {
    pub id: String,
    pub name: String,
}

/// Chapter row returned from SELECT queries
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ChapterRow {
    pub id: i32,
    pub name: String,
    #[serde(rename = "order")]
    pub chapter_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Song row returned from SELECT queries
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SongRow {
    pub id: i32,
    pub title: String,
    pub file_name: String,
    pub artist: Option<String>,
    pub drive_file_id: Option<String>,
    pub file_url: Option<String>,
    pub duration: Option<String>,
    pub image_id: Option<String>,
    pub image_url: Option<String>,
    pub lyrics: Option<String>,
    pub chapter_id: i32,
    pub genre_id: String,
    pub is_new: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A chapter together with its songs, as served by `GET /api/chapters/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChapterWithSongs {
    #[serde(flatten)]
    pub chapter: ChapterRow,
    pub songs: Vec<SongRow>,
}
