//! Repository for the `recipes`, `ingredients`, and `instructions` tables.
//!
//! Writes that touch a recipe and its children run in one transaction so a
//! reader never observes a recipe without its ingredients or instructions.

use std::collections::HashMap;

use chef_core::recipe::Recipe;
use chef_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::recipe::{
    new_ingredients, new_instructions, IngredientRow, InstructionRow, RecipeFields, RecipeRow,
    StoredRecipe,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, source_url, base_servings, prep_time, cook_time, \
                       difficulty, cuisine_type, created_at, updated_at";

const INGREDIENT_COLUMNS: &str = "id, recipe_id, name, amount, unit, original_text, created_at";

const INSTRUCTION_COLUMNS: &str = "id, recipe_id, step_number, instruction_text, created_at";

/// Provides CRUD and dedup operations for recipes.
pub struct RecipeRepo;

impl RecipeRepo {
    /// Insert a recipe with its ingredients and instructions.
    ///
    /// A `source_url` that already exists violates `uq_recipes_source_url`.
    pub async fn create(
        pool: &PgPool,
        recipe: &Recipe,
        source_url: Option<&str>,
    ) -> Result<StoredRecipe, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO recipes
                (title, source_url, base_servings, prep_time, cook_time, difficulty, cuisine_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let fields = RecipeFields::from_recipe(recipe);
        let row = bind_fields(sqlx::query_as::<_, RecipeRow>(&query), &fields, source_url)
            .fetch_one(&mut *tx)
            .await?;

        let stored = insert_children(&mut tx, row, recipe).await?;
        tx.commit().await?;
        Ok(stored)
    }

    /// Insert a recipe keyed by `source_url`, or return the row that already
    /// holds that key.
    ///
    /// Returns the stored recipe and `true` when this call created it. When a
    /// concurrent writer committed first, the insert is abandoned and the
    /// existing row is returned with `false`.
    pub async fn create_or_get(
        pool: &PgPool,
        recipe: &Recipe,
        source_url: &str,
    ) -> Result<(StoredRecipe, bool), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO recipes
                (title, source_url, base_servings, prep_time, cook_time, difficulty, cuisine_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (source_url) DO NOTHING
             RETURNING {COLUMNS}"
        );
        let fields = RecipeFields::from_recipe(recipe);
        let inserted = bind_fields(sqlx::query_as::<_, RecipeRow>(&query), &fields, Some(source_url))
            .fetch_optional(&mut *tx)
            .await?;

        match inserted {
            Some(row) => {
                let stored = insert_children(&mut tx, row, recipe).await?;
                tx.commit().await?;
                Ok((stored, true))
            }
            None => {
                tx.rollback().await?;
                let existing = Self::find_by_source_url(pool, source_url)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?;
                Ok((existing, false))
            }
        }
    }

    /// Find a recipe by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<StoredRecipe>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recipes WHERE id = $1");
        let row = sqlx::query_as::<_, RecipeRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        match row {
            Some(row) => Ok(load_children(pool, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Find a recipe by exact `source_url` match. No normalization is applied.
    pub async fn find_by_source_url(
        pool: &PgPool,
        source_url: &str,
    ) -> Result<Option<StoredRecipe>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recipes WHERE source_url = $1");
        let row = sqlx::query_as::<_, RecipeRow>(&query)
            .bind(source_url)
            .fetch_optional(pool)
            .await?;
        match row {
            Some(row) => Ok(load_children(pool, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// List recipes, most recently created first.
    pub async fn list(
        pool: &PgPool,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<StoredRecipe>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM recipes
             ORDER BY created_at DESC, id DESC
             OFFSET $1 LIMIT $2"
        );
        let rows = sqlx::query_as::<_, RecipeRow>(&query)
            .bind(skip)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        load_children(pool, rows).await
    }

    /// Replace a recipe's fields, ingredients, and instructions.
    ///
    /// `source_url` is left untouched. Returns `None` if no row with the
    /// given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        recipe: &Recipe,
    ) -> Result<Option<StoredRecipe>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE recipes SET
                title = $1,
                base_servings = $2,
                prep_time = $3,
                cook_time = $4,
                difficulty = $5,
                cuisine_type = $6,
                updated_at = NOW()
             WHERE id = $7
             RETURNING {COLUMNS}"
        );
        let fields = RecipeFields::from_recipe(recipe);
        let row = sqlx::query_as::<_, RecipeRow>(&query)
            .bind(fields.title)
            .bind(fields.base_servings)
            .bind(fields.prep_time)
            .bind(fields.cook_time)
            .bind(fields.difficulty)
            .bind(fields.cuisine_type)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("DELETE FROM ingredients WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM instructions WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let stored = insert_children(&mut tx, row, recipe).await?;
        tx.commit().await?;
        Ok(Some(stored))
    }

    /// Delete a recipe by ID; ingredients and instructions cascade.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type RecipeQuery<'q> =
    sqlx::query::QueryAs<'q, sqlx::Postgres, RecipeRow, sqlx::postgres::PgArguments>;

/// Bind the seven insert parameters in column order.
fn bind_fields<'q>(
    query: RecipeQuery<'q>,
    fields: &RecipeFields<'q>,
    source_url: Option<&'q str>,
) -> RecipeQuery<'q> {
    query
        .bind(fields.title)
        .bind(source_url)
        .bind(fields.base_servings)
        .bind(fields.prep_time)
        .bind(fields.cook_time)
        .bind(fields.difficulty)
        .bind(fields.cuisine_type)
}

/// Insert ingredients (in order) and instructions (numbered from 1) for a
/// freshly written recipe row.
async fn insert_children(
    conn: &mut PgConnection,
    row: RecipeRow,
    recipe: &Recipe,
) -> Result<StoredRecipe, sqlx::Error> {
    let ingredient_query = format!(
        "INSERT INTO ingredients (recipe_id, name, amount, unit, original_text)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {INGREDIENT_COLUMNS}"
    );
    let mut ingredients = Vec::with_capacity(recipe.ingredients.len());
    for ingredient in new_ingredients(recipe) {
        let inserted = sqlx::query_as::<_, IngredientRow>(&ingredient_query)
            .bind(row.id)
            .bind(&ingredient.name)
            .bind(ingredient.amount)
            .bind(&ingredient.unit)
            .bind(&ingredient.original_text)
            .fetch_one(&mut *conn)
            .await?;
        ingredients.push(inserted);
    }

    let instruction_query = format!(
        "INSERT INTO instructions (recipe_id, step_number, instruction_text)
         VALUES ($1, $2, $3)
         RETURNING {INSTRUCTION_COLUMNS}"
    );
    let mut instructions = Vec::with_capacity(recipe.instructions.len());
    for (step_number, text) in new_instructions(recipe) {
        let inserted = sqlx::query_as::<_, InstructionRow>(&instruction_query)
            .bind(row.id)
            .bind(step_number)
            .bind(text)
            .fetch_one(&mut *conn)
            .await?;
        instructions.push(inserted);
    }

    Ok(StoredRecipe {
        recipe: row,
        ingredients,
        instructions,
    })
}

/// Attach ingredients and instructions to a batch of recipe rows, keeping
/// the order of `rows`.
async fn load_children(
    pool: &PgPool,
    rows: Vec<RecipeRow>,
) -> Result<Vec<StoredRecipe>, sqlx::Error> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();

    let query = format!(
        "SELECT {INGREDIENT_COLUMNS} FROM ingredients
         WHERE recipe_id = ANY($1)
         ORDER BY recipe_id, id"
    );
    let ingredient_rows = sqlx::query_as::<_, IngredientRow>(&query)
        .bind(&ids)
        .fetch_all(pool)
        .await?;

    let query = format!(
        "SELECT {INSTRUCTION_COLUMNS} FROM instructions
         WHERE recipe_id = ANY($1)
         ORDER BY recipe_id, step_number"
    );
    let instruction_rows = sqlx::query_as::<_, InstructionRow>(&query)
        .bind(&ids)
        .fetch_all(pool)
        .await?;

    let mut ingredients: HashMap<DbId, Vec<IngredientRow>> = HashMap::new();
    for row in ingredient_rows {
        ingredients.entry(row.recipe_id).or_default().push(row);
    }
    let mut instructions: HashMap<DbId, Vec<InstructionRow>> = HashMap::new();
    for row in instruction_rows {
        instructions.entry(row.recipe_id).or_default().push(row);
    }

    Ok(rows
        .into_iter()
        .map(|recipe| StoredRecipe {
            ingredients: ingredients.remove(&recipe.id).unwrap_or_default(),
            instructions: instructions.remove(&recipe.id).unwrap_or_default(),
            recipe,
        })
        .collect())
}
