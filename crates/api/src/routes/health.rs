use axum::routing::get;
use axum::Router;

use crate::handlers::health;
use crate::state::AppState;

/// Health routes, mounted at the root.
///
/// ```text
/// GET    /          -> health_check
/// GET    /health    -> health_check
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health_check))
        .route("/health", get(health::health_check))
}
