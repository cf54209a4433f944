//! The recipe artifact: overview, ingredients, and ordered instructions.
//!
//! The serialized field names are the wire contract shared by the inference
//! collaborator's JSON output and the HTTP API (`recipe_overview`, `item`,
//! `amount`, ...). Deserialization enforces the structural shape; content
//! checks (non-empty title, positive servings) live in [`Recipe::check`] so
//! that a structurally sound but invalid candidate can still be inspected.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::DbId;
use crate::validation::flatten_errors;

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Difficulty rating reported for a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Name as stored in the `recipes.difficulty` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    /// Parse from the stored column value. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Easy" => Some(Self::Easy),
            "Intermediate" => Some(Self::Intermediate),
            "Advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Recipe shape
// ---------------------------------------------------------------------------

/// Headline facts about a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RecipeOverview {
    /// Store identifier; only present on recipes read back from the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DbId>,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    #[validate(range(min = 1, message = "servings must be at least 1"))]
    pub servings: i32,
    pub difficulty: Option<Difficulty>,
    pub cuisine_type: Option<String>,
}

/// One ingredient line. `amount` is display text, e.g. `"1/2"` or `"2"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub item: String,
    pub amount: String,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

/// A structured recipe. Instruction order is significant: step N is
/// `instructions[N - 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Recipe {
    /// Store identifier, mirrored from `recipe_overview.id` for clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DbId>,
    #[serde(rename = "recipe_overview")]
    #[validate(nested)]
    pub overview: RecipeOverview,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    /// Kept on the in-memory artifact only; the store does not persist it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<Vec<String>>,
}

impl Recipe {
    /// Parse a candidate recipe from a JSON payload.
    ///
    /// Fails when the payload is not JSON or does not match the recipe shape
    /// (missing required fields, wrong types).
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// Run the content checks and return every finding as a message.
    ///
    /// An empty vector means the recipe is valid. Messages are sorted so the
    /// output is stable across runs.
    pub fn check(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => flatten_errors(&errors),
        }
    }

    /// Attach a store identifier to both the top level and the overview.
    pub fn with_id(mut self, id: DbId) -> Self {
        self.id = Some(id);
        self.overview.id = Some(id);
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
