use chrono::Utc;
use drive_client::{DriveClient, TokenRefresher};
use songbook_server::config::Config;
use songbook_server::credentials::PgCredentialStore;
use songbook_server::error::ServerError;
use songbook_server::server::{cors_layer, create_router, start_server, with_static_files};
use songbook_server::state::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("songbook_server=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    let config = Config::from_env();
    info!(port = config.port, "Starting songbook-server");
    info!(lyrics_dir = ?config.lyrics_dir, song_order_path = ?config.song_order_path, "Paths");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&config.database_url)
        .await?;

    let credentials = Arc::new(PgCredentialStore::new(pool.clone()));
    let tokens = Arc::new(TokenRefresher::with_token_url(
        credentials,
        &config.google_token_url,
    ));
    let drive = DriveClient::with_api_base(tokens, &config.google_drive_api_url);

    let state = AppState {
        pool,
        drive: Arc::new(drive),
        lyrics_dir: config.lyrics_dir.clone(),
        song_order_path: config.song_order_path.clone(),
        started_at: Utc::now(),
    };

    let mut router = create_router(state, cors_layer(&config.cors_origins));
    if let Some(public_path) = &config.public_path {
        router = with_static_files(router, public_path);
    }

    start_server(router, config.port).await?;
    Ok(())
}
