pub mod types;
pub mod vcs;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use types::AppState;

// Re-export the API documentation
pub use vcs::VcsApiDoc;

/// Configure all routes of the VCS proxy surface.
pub fn configure_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/vcs/config", get(vcs::get_vcs_config))
        .route(
            "/api/token",
            post(vcs::create_token).delete(vcs::remove_token),
        )
        .route("/api/vcs/repositories", get(vcs::get_repositories))
        .route("/api/vcs/branches", get(vcs::get_branches))
        .route("/api/vcs", get(vcs::get_directory_content))
        .route("/api/vcs/file", get(vcs::get_file_content))
}
