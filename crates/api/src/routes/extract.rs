//! Route definitions for recipe extraction.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::extract;
use crate::state::AppState;

/// Routes mounted at `/extract`.
///
/// ```text
/// POST   /          -> extract_recipe
/// GET    /demo      -> extract_demo
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(extract::extract_recipe))
        .route("/demo", get(extract::extract_demo))
}
