//! HTTP router and listener for the songbook API

use crate::routes;
use crate::state::AppState;
use axum::http::{header, Method};
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

/// CORS for the configured origins. `*` opens it to everyone.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::CONTENT_TYPE, header::RANGE])
            .expose_headers([header::CONTENT_RANGE, header::ACCEPT_RANGES])
    }
}

/// Create the HTTP router
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        // Config
        .route("/api/config", patch(routes::config::update_config))
        // Genres
        .route(
            "/api/genres",
            get(routes::genres::list_genres)
                .post(routes::genres::create_genre)
                .put(routes::genres::update_genre)
                .delete(routes::genres::delete_genre_by_query),
        )
        .route("/api/genres/", delete(routes::genres::delete_genre_missing_id))
        .route("/api/genres/{id}", delete(routes::genres::delete_genre))
        // Lyrics files
        .route("/api/lyrics", get(routes::lyrics::get_lyrics))
        // Songs - specific routes before the id route
        .route("/api/songs", get(routes::songs::list_songs))
        .route("/api/songs/reorder", post(routes::songs::reorder))
        .route("/api/songs/{id}", get(routes::songs::get_song))
        .route("/api/songs/{id}/lyrics", put(routes::songs::update_lyrics))
        .route(
            "/api/songs/{id}/toggle-new",
            patch(routes::songs::toggle_new),
        )
        // Chapters
        .route("/api/chapters/{id}", get(routes::chapters::get_chapter))
        // Drive
        .route("/api/auth/refresh", get(routes::auth::refresh))
        .route("/api/image-proxy", get(routes::media::image_proxy))
        .route("/api/proxy/{id}", get(routes::media::proxy_media))
        .layer(cors)
        .with_state(state)
}

/// Serve a built front-end from `public_path`, falling back to `index.html`
/// for client-side routes.
pub fn with_static_files(router: Router, public_path: &Path) -> Router {
    info!(public_path = ?public_path, "Serving static files");
    let spa_fallback =
        ServeDir::new(public_path).fallback(ServeFile::new(public_path.join("index.html")));
    router.fallback_service(spa_fallback)
}

/// Start the HTTP server
pub async fn start_server(router: Router, port: u16) -> std::io::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}
