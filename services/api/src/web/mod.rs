pub mod account;
pub mod rest;
pub mod state;

pub use account::{get_link_handler, link_handler, unlink_handler};
pub use rest::{catalog_handler, normalize_handler, progress_handler};

use axum::{
    routing::{get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;

/// All API routes, without middleware layers.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/courses/{category}", get(catalog_handler))
        .route("/progress/normalize", post(normalize_handler))
        .route("/progress/{username}", get(progress_handler))
        .route(
            "/account/link",
            get(get_link_handler).put(link_handler).delete(unlink_handler),
        )
        .with_state(app_state)
}
