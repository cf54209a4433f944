//! The [`RecipeStore`] trait and its PostgreSQL implementation.

use async_trait::async_trait;
use chef_core::recipe::Recipe;
use chef_core::types::DbId;

use crate::models::recipe::StoredRecipe;
use crate::repositories::RecipeRepo;
use crate::DbPool;

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. a duplicate `source_url`
    /// on direct creation).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Any other database failure.
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // PostgreSQL unique constraint violation: error code 23505
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                let constraint = db_err.constraint().unwrap_or("unknown");
                Self::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ))
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(err.to_string())
            }
            _ => Self::Database(err),
        }
    }
}

/// Result of a keyed insert: the row that now holds the key, and whether
/// this call created it.
#[derive(Debug, Clone)]
pub struct InsertOutcome {
    pub recipe: StoredRecipe,
    pub created: bool,
}

/// Persistence operations for recipes.
///
/// Implementations must be safe to share across tasks. `source_url` is an
/// exact-match key: no trimming, case folding, or query-string stripping.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Look up a recipe by exact `source_url`.
    async fn find_by_source_url(&self, source_url: &str)
        -> Result<Option<StoredRecipe>, StoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<StoredRecipe>, StoreError>;

    /// Newest first, skipping `skip` rows and returning at most `limit`.
    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<StoredRecipe>, StoreError>;

    /// Insert a recipe. A `source_url` already held by another recipe is a
    /// [`StoreError::Conflict`].
    async fn create(
        &self,
        recipe: &Recipe,
        source_url: Option<&str>,
    ) -> Result<StoredRecipe, StoreError>;

    /// Insert a recipe under `source_url`, or return the recipe already
    /// holding that key. The first committed writer wins.
    async fn create_or_get(
        &self,
        recipe: &Recipe,
        source_url: &str,
    ) -> Result<InsertOutcome, StoreError>;

    /// Replace fields, ingredients, and instructions. `None` if absent.
    async fn update(&self, id: DbId, recipe: &Recipe) -> Result<Option<StoredRecipe>, StoreError>;

    /// Delete a recipe and its children. `false` if absent.
    async fn delete(&self, id: DbId) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// [`RecipeStore`] backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgRecipeStore {
    pool: DbPool,
}

impl PgRecipeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeStore for PgRecipeStore {
    async fn find_by_source_url(
        &self,
        source_url: &str,
    ) -> Result<Option<StoredRecipe>, StoreError> {
        Ok(RecipeRepo::find_by_source_url(&self.pool, source_url).await?)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<StoredRecipe>, StoreError> {
        Ok(RecipeRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<StoredRecipe>, StoreError> {
        Ok(RecipeRepo::list(&self.pool, skip, limit).await?)
    }

    async fn create(
        &self,
        recipe: &Recipe,
        source_url: Option<&str>,
    ) -> Result<StoredRecipe, StoreError> {
        let stored = RecipeRepo::create(&self.pool, recipe, source_url).await?;
        tracing::info!(recipe_id = stored.id(), title = %stored.recipe.title, "Recipe created");
        Ok(stored)
    }

    async fn create_or_get(
        &self,
        recipe: &Recipe,
        source_url: &str,
    ) -> Result<InsertOutcome, StoreError> {
        let (stored, created) = RecipeRepo::create_or_get(&self.pool, recipe, source_url).await?;
        if created {
            tracing::info!(recipe_id = stored.id(), source_url, "Recipe created");
        } else {
            tracing::info!(
                recipe_id = stored.id(),
                source_url,
                "Recipe for source_url already existed, returning stored row",
            );
        }
        Ok(InsertOutcome {
            recipe: stored,
            created,
        })
    }

    async fn update(&self, id: DbId, recipe: &Recipe) -> Result<Option<StoredRecipe>, StoreError> {
        let updated = RecipeRepo::update(&self.pool, id, recipe).await?;
        if updated.is_some() {
            tracing::info!(recipe_id = id, "Recipe updated");
        }
        Ok(updated)
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        let deleted = RecipeRepo::delete(&self.pool, id).await?;
        if deleted {
            tracing::info!(recipe_id = id, "Recipe deleted");
        }
        Ok(deleted)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
