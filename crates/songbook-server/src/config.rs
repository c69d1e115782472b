use std::env;
use std::path::PathBuf;

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub cors_origins: Vec<String>,
    pub lyrics_dir: PathBuf,
    pub song_order_path: PathBuf,
    pub google_token_url: String,
    pub google_drive_api_url: String,
    /// Static front-end bundle, served as the fallback when set
    pub public_path: Option<PathBuf>,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/songbook".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ]
            });

        let lyrics_dir = env::var("LYRICS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./public/lyrics"));

        let song_order_path = env::var("SONG_ORDER_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/songs.json"));

        let google_token_url = env::var("GOOGLE_TOKEN_URL")
            .unwrap_or_else(|_| drive_client::TokenRefresher::DEFAULT_TOKEN_URL.to_string());

        let google_drive_api_url = env::var("GOOGLE_DRIVE_API_URL")
            .unwrap_or_else(|_| drive_client::DriveClient::DEFAULT_API_BASE.to_string());

        let public_path = env::var("PUBLIC_PATH").ok().map(PathBuf::from);

        Self {
            port,
            database_url,
            cors_origins,
            lyrics_dir,
            song_order_path,
            google_token_url,
            google_drive_api_url,
            public_path,
        }
    }
}
