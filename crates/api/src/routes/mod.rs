pub mod extract;
pub mod health;
pub mod recipes;

use axum::Router;

use crate::state::AppState;

/// Build the route tree.
///
/// Route hierarchy:
///
/// ```text
/// /                                   service health
/// /health                             service health
///
/// /extract                            extract a recipe from a video URL (POST)
/// /extract/demo                       extract the built-in demo URL (GET)
///
/// /recipes                            list, create
/// /recipes/{id}                       get, update, delete
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/extract", extract::router())
        .nest("/recipes", recipes::router())
}
