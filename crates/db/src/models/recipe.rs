//! Recipe, ingredient, and instruction rows plus the mapping to and from
//! the [`Recipe`] artifact.

use chef_core::amount::{self, ParsedAmount};
use chef_core::recipe::{Difficulty, Ingredient, Recipe, RecipeOverview};
use chef_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `recipes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecipeRow {
    pub id: DbId,
    pub title: String,
    pub source_url: Option<String>,
    pub base_servings: i32,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub difficulty: Option<String>,
    pub cuisine_type: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `ingredients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IngredientRow {
    pub id: DbId,
    pub recipe_id: DbId,
    pub name: String,
    pub amount: f64,
    pub unit: Option<String>,
    pub original_text: Option<String>,
    pub created_at: Timestamp,
}

/// A row from the `instructions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InstructionRow {
    pub id: DbId,
    pub recipe_id: DbId,
    pub step_number: i32,
    pub instruction_text: String,
    pub created_at: Timestamp,
}

/// A persisted recipe with its owned children.
///
/// Ingredients are kept in insertion order and instructions in ascending
/// `step_number`.
#[derive(Debug, Clone, Serialize)]
pub struct StoredRecipe {
    pub recipe: RecipeRow,
    pub ingredients: Vec<IngredientRow>,
    pub instructions: Vec<InstructionRow>,
}

impl StoredRecipe {
    pub fn id(&self) -> DbId {
        self.recipe.id
    }

    pub fn source_url(&self) -> Option<&str> {
        self.recipe.source_url.as_deref()
    }

    /// Render the stored rows as a [`Recipe`] artifact.
    ///
    /// Amounts come back as decimal text (`"2.0"`), ingredient notes carry the
    /// stored `original_text`, and equipment is absent because it is never
    /// persisted.
    pub fn to_recipe(&self) -> Recipe {
        let row = &self.recipe;
        let overview = RecipeOverview {
            id: None,
            title: row.title.clone(),
            prep_time: row.prep_time.clone(),
            cook_time: row.cook_time.clone(),
            servings: row.base_servings,
            difficulty: row.difficulty.as_deref().and_then(Difficulty::from_name),
            cuisine_type: row.cuisine_type.clone(),
        };

        let ingredients = self
            .ingredients
            .iter()
            .map(|i| Ingredient {
                item: i.name.clone(),
                amount: amount::format_amount(i.amount),
                unit: i.unit.clone(),
                notes: i.original_text.clone(),
            })
            .collect();

        let mut steps: Vec<&InstructionRow> = self.instructions.iter().collect();
        steps.sort_by_key(|s| s.step_number);

        Recipe {
            id: None,
            overview,
            ingredients,
            instructions: steps.iter().map(|s| s.instruction_text.clone()).collect(),
            equipment: None,
        }
        .with_id(row.id)
    }
}

/// Column values for a new or replaced `recipes` row.
#[derive(Debug, Clone)]
pub struct RecipeFields<'a> {
    pub title: &'a str,
    pub base_servings: i32,
    pub prep_time: Option<&'a str>,
    pub cook_time: Option<&'a str>,
    pub difficulty: Option<&'static str>,
    pub cuisine_type: Option<&'a str>,
}

impl<'a> RecipeFields<'a> {
    pub fn from_recipe(recipe: &'a Recipe) -> Self {
        let o = &recipe.overview;
        Self {
            title: &o.title,
            base_servings: o.servings,
            prep_time: o.prep_time.as_deref(),
            cook_time: o.cook_time.as_deref(),
            difficulty: o.difficulty.map(Difficulty::as_str),
            cuisine_type: o.cuisine_type.as_deref(),
        }
    }
}

/// Column values for a new `ingredients` row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIngredient {
    pub name: String,
    pub amount: f64,
    pub unit: Option<String>,
    pub original_text: String,
    /// Whether `amount` is the fallback value rather than parsed text.
    pub amount_fell_back: bool,
}

impl NewIngredient {
    pub fn from_ingredient(ingredient: &Ingredient) -> Self {
        let parsed = ParsedAmount::parse(&ingredient.amount);
        if parsed.is_fallback() {
            tracing::debug!(
                item = %ingredient.item,
                amount = %ingredient.amount,
                "Non-numeric ingredient amount stored as fallback value",
            );
        }
        Self {
            name: ingredient.item.clone(),
            amount: parsed.value(),
            unit: ingredient.unit.clone(),
            original_text: amount::original_text(
                &ingredient.amount,
                ingredient.unit.as_deref(),
                &ingredient.item,
            ),
            amount_fell_back: parsed.is_fallback(),
        }
    }
}

/// Prepare ingredient rows for a recipe, preserving order.
pub fn new_ingredients(recipe: &Recipe) -> Vec<NewIngredient> {
    recipe
        .ingredients
        .iter()
        .map(NewIngredient::from_ingredient)
        .collect()
}

/// Prepare `(step_number, text)` pairs for a recipe; steps start at 1.
pub fn new_instructions(recipe: &Recipe) -> Vec<(i32, &str)> {
    recipe
        .instructions
        .iter()
        .enumerate()
        .map(|(i, text)| (i as i32 + 1, text.as_str()))
        .collect()
}
