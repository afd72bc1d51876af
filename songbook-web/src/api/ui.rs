//! PWA shell serving routes
//!
//! Static shell assets compiled into the binary: the page, the manifest,
//! the service worker, the offline fallback, and the logo.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

const INDEX_HTML: &str = include_str!("../ui/index.html");
const APP_JS: &str = include_str!("../ui/app.js");
const MANIFEST_JSON: &str = include_str!("../ui/manifest.json");
const SERVICE_WORKER_JS: &str = include_str!("../ui/sw.js");
const OFFLINE_HTML: &str = include_str!("../ui/offline.html");
const LOGO_SVG: &str = include_str!("../ui/logo.svg");

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        APP_JS,
    )
        .into_response()
}

/// GET /manifest.json
pub async fn serve_manifest() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/manifest+json")],
        MANIFEST_JSON,
    )
        .into_response()
}

/// GET /sw.js
///
/// The browser-side form of the offline cache manager; same cache name,
/// precache list, and fallback policy as `crate::offline`.
pub async fn serve_service_worker() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        SERVICE_WORKER_JS,
    )
        .into_response()
}

/// GET /offline.html
pub async fn serve_offline_page() -> Html<&'static str> {
    Html(OFFLINE_HTML)
}

/// GET /logo.svg
pub async fn serve_logo() -> Response {
    (StatusCode::OK, [("content-type", "image/svg+xml")], LOGO_SVG).into_response()
}
