//! songbook-web library - HTTP service for the song lyrics collection
//!
//! Exposes the CRUD API, the image upload endpoint, and the static PWA
//! shell, plus the two self-contained cores: near-duplicate title detection
//! and the offline shell cache manager.

use axum::Router;
use sqlx::SqlitePool;
use std::path::PathBuf;

pub mod api;
pub mod dedup;
pub mod error;
pub mod offline;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Directory holding uploaded image attachments
    pub uploads_dir: PathBuf,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, uploads_dir: PathBuf) -> Self {
        Self { db, uploads_dir }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};
    use tower_http::services::ServeDir;
    use tower_http::trace::TraceLayer;

    let api = Router::new()
        .route(
            "/api/songs",
            get(api::songs::list_songs)
                .post(api::songs::create_song)
                .delete(api::songs::delete_all_songs),
        )
        .route(
            "/api/songs/:id",
            put(api::songs::update_song).delete(api::songs::delete_song),
        )
        .route("/api/songs/:id/choir", put(api::songs::set_choir_practice))
        .route("/api/upload", post(api::upload::upload_image))
        .route("/api/login", post(api::auth::login));

    // PWA shell: static assets compiled into the binary
    let shell = Router::new()
        .route("/", get(api::ui::serve_index))
        .route("/static/app.js", get(api::ui::serve_app_js))
        .route("/manifest.json", get(api::ui::serve_manifest))
        .route("/sw.js", get(api::ui::serve_service_worker))
        .route("/offline.html", get(api::ui::serve_offline_page))
        .route("/logo.svg", get(api::ui::serve_logo))
        .merge(api::health::health_routes());

    Router::new()
        .merge(api)
        .merge(shell)
        .nest_service("/uploads", ServeDir::new(&state.uploads_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
