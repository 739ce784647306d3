//! HTTP proxy controller for the VCS navigation service.
//!
//! The sole network-facing surface: resolves provider configuration and
//! per-session credentials, dispatches to the matching provider adapter and
//! translates every failure into the stable `{message, code}` contract.

pub mod credentials;
pub mod handlers;
pub mod settings;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use handlers::types::AppState;
pub use settings::ServerSettings;

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Assemble the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    handlers::configure_routes()
        .route("/health", get(health))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
