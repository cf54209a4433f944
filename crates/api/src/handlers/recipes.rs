//! Handlers for direct recipe CRUD.
//!
//! Recipes created here bypass extraction. A `source_url` given on create
//! takes part in dedup like an extracted one; update never changes it.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use chef_core::error::CoreError;
use chef_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use chef_core::recipe::Recipe;
use chef_core::types::DbId;
use chef_core::video_url::http_url;

use crate::error::{AppError, AppResult};
use crate::extractors::{AppQuery, ValidatedJson};
use crate::query::PaginationParams;
use crate::state::AppState;

/// Body of `POST /recipes` and `PUT /recipes/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct RecipeInput {
    #[validate(nested)]
    pub recipe: Recipe,
    #[validate(
        url(message = "source_url must be a valid URL"),
        custom(function = "http_url")
    )]
    pub source_url: Option<String>,
}

/// Response of create, update, and delete.
#[derive(Debug, Serialize)]
pub struct RecipeWriteResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<DbId>,
    pub message: &'static str,
}

/// Response of `GET /recipes/{id}`.
#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub success: bool,
    pub recipe: Recipe,
}

/// Response of `GET /recipes`.
#[derive(Debug, Serialize)]
pub struct RecipeListResponse {
    pub success: bool,
    pub recipes: Vec<Recipe>,
    pub count: usize,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Recipe",
        id,
    })
}

// ---------------------------------------------------------------------------
// POST /recipes
// ---------------------------------------------------------------------------

/// Store a recipe without running extraction.
pub async fn create_recipe(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RecipeInput>,
) -> AppResult<Json<RecipeWriteResponse>> {
    let stored = state
        .store
        .create(&input.recipe, input.source_url.as_deref())
        .await?;

    tracing::info!(
        recipe_id = stored.id(),
        source_url = ?input.source_url,
        "Recipe created"
    );

    Ok(Json(RecipeWriteResponse {
        success: true,
        recipe_id: Some(stored.id()),
        message: "Recipe saved successfully",
    }))
}

// ---------------------------------------------------------------------------
// GET /recipes
// ---------------------------------------------------------------------------

/// List recipes, newest first.
pub async fn list_recipes(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<RecipeListResponse>> {
    let skip = clamp_offset(params.skip);
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);

    let recipes: Vec<Recipe> = state
        .store
        .list(skip, limit)
        .await?
        .iter()
        .map(|stored| stored.to_recipe())
        .collect();

    Ok(Json(RecipeListResponse {
        success: true,
        count: recipes.len(),
        recipes,
    }))
}

// ---------------------------------------------------------------------------
// GET /recipes/{id}
// ---------------------------------------------------------------------------

/// Get a single recipe by ID.
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<RecipeResponse>> {
    let stored = state.store.find_by_id(id).await?.ok_or_else(|| not_found(id))?;

    Ok(Json(RecipeResponse {
        success: true,
        recipe: stored.to_recipe(),
    }))
}

// ---------------------------------------------------------------------------
// PUT /recipes/{id}
// ---------------------------------------------------------------------------

/// Replace a recipe's fields, ingredients, and instructions.
///
/// A `source_url` in the body is ignored.
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<RecipeInput>,
) -> AppResult<Json<RecipeWriteResponse>> {
    let updated = state
        .store
        .update(id, &input.recipe)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(recipe_id = updated.id(), "Recipe updated");

    Ok(Json(RecipeWriteResponse {
        success: true,
        recipe_id: Some(updated.id()),
        message: "Recipe updated successfully",
    }))
}

// ---------------------------------------------------------------------------
// DELETE /recipes/{id}
// ---------------------------------------------------------------------------

/// Delete a recipe with its ingredients and instructions.
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<RecipeWriteResponse>> {
    if !state.store.delete(id).await? {
        return Err(not_found(id));
    }

    tracing::info!(recipe_id = id, "Recipe deleted");

    Ok(Json(RecipeWriteResponse {
        success: true,
        recipe_id: None,
        message: "Recipe deleted successfully",
    }))
}
