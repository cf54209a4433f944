//! Persistence gateway for recipes.
//!
//! [`store::RecipeStore`] is the seam the extraction pipeline and the HTTP
//! layer depend on. [`store::PgRecipeStore`] backs it with PostgreSQL via
//! [`repositories::RecipeRepo`]; [`memory::MemoryRecipeStore`] keeps
//! everything in process for tests and local runs.

pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;

pub use memory::MemoryRecipeStore;
pub use store::{InsertOutcome, PgRecipeStore, RecipeStore, StoreError};

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
