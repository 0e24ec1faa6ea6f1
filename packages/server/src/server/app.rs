//! Application setup and server configuration.

use axum::{
    extract::Extension,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::extract_client_ip;
use crate::server::routes::{
    health_handler, publish_handler, sitemap_submit_handler, sitemap_tick_handler,
};

/// Build the HTTP router around the shared dependencies.
pub fn build_app(deps: ServerDeps) -> Router {
    Router::new()
        // CMS hook
        .route("/publish", post(publish_handler))
        // Operator triggers
        .route("/sitemap/submit", post(sitemap_submit_handler))
        .route("/sitemap/tick", post(sitemap_tick_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(extract_client_ip))
        .layer(Extension(deps))
        .layer(TraceLayer::new_for_http())
}
