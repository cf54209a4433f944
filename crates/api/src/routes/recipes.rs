//! Route definitions for stored recipes.

use axum::routing::get;
use axum::Router;

use crate::handlers::recipes;
use crate::state::AppState;

/// Routes mounted at `/recipes`.
///
/// ```text
/// GET    /          -> list_recipes
/// POST   /          -> create_recipe
/// GET    /{id}      -> get_recipe
/// PUT    /{id}      -> update_recipe
/// DELETE /{id}      -> delete_recipe
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(recipes::list_recipes).post(recipes::create_recipe))
        .route(
            "/{id}",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
}
