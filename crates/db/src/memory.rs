//! In-process [`RecipeStore`] used by unit tests and the HTTP integration
//! suite.
//!
//! Mirrors the PostgreSQL semantics that callers can observe: sequential
//! ids, a unique `source_url`, newest-first listing, cascading deletes, and
//! the same ingredient amount policy.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chef_core::recipe::Recipe;
use chef_core::types::DbId;

use crate::models::recipe::{
    new_ingredients, new_instructions, IngredientRow, InstructionRow, RecipeFields, RecipeRow,
    StoredRecipe,
};
use crate::store::{InsertOutcome, RecipeStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    last_recipe_id: DbId,
    last_child_id: DbId,
    recipes: BTreeMap<DbId, StoredRecipe>,
}

impl Inner {
    fn next_child_id(&mut self) -> DbId {
        self.last_child_id += 1;
        self.last_child_id
    }

    fn holder_of(&self, source_url: &str) -> Option<&StoredRecipe> {
        self.recipes
            .values()
            .find(|r| r.source_url() == Some(source_url))
    }

    fn insert(&mut self, recipe: &Recipe, source_url: Option<&str>) -> StoredRecipe {
        self.last_recipe_id += 1;
        let id = self.last_recipe_id;
        let now = chrono::Utc::now();
        let fields = RecipeFields::from_recipe(recipe);

        let row = RecipeRow {
            id,
            title: fields.title.to_string(),
            source_url: source_url.map(str::to_string),
            base_servings: fields.base_servings,
            prep_time: fields.prep_time.map(str::to_string),
            cook_time: fields.cook_time.map(str::to_string),
            difficulty: fields.difficulty.map(str::to_string),
            cuisine_type: fields.cuisine_type.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        let stored = StoredRecipe {
            ingredients: self.ingredient_rows(id, recipe),
            instructions: self.instruction_rows(id, recipe),
            recipe: row,
        };
        self.recipes.insert(id, stored.clone());
        stored
    }

    fn ingredient_rows(&mut self, recipe_id: DbId, recipe: &Recipe) -> Vec<IngredientRow> {
        let now = chrono::Utc::now();
        new_ingredients(recipe)
            .into_iter()
            .map(|i| IngredientRow {
                id: self.next_child_id(),
                recipe_id,
                name: i.name,
                amount: i.amount,
                unit: i.unit,
                original_text: Some(i.original_text),
                created_at: now,
            })
            .collect()
    }

    fn instruction_rows(&mut self, recipe_id: DbId, recipe: &Recipe) -> Vec<InstructionRow> {
        let now = chrono::Utc::now();
        new_instructions(recipe)
            .into_iter()
            .map(|(step_number, text)| InstructionRow {
                id: self.next_child_id(),
                recipe_id,
                step_number,
                instruction_text: text.to_string(),
                created_at: now,
            })
            .collect()
    }
}

/// A [`RecipeStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryRecipeStore {
    inner: Mutex<Inner>,
    unavailable: AtomicBool,
}

impl MemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable store: while set, every call fails with
    /// [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of recipes currently stored under `source_url`.
    pub fn count_by_source_url(&self, source_url: &str) -> usize {
        self.lock()
            .recipes
            .values()
            .filter(|r| r.source_url() == Some(source_url))
            .count()
    }

    /// Total number of stored recipes.
    pub fn len(&self) -> usize {
        self.lock().recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn available(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store is switched off".to_string(),
            ));
        }
        Ok(self.lock())
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn find_by_source_url(
        &self,
        source_url: &str,
    ) -> Result<Option<StoredRecipe>, StoreError> {
        Ok(self.available()?.holder_of(source_url).cloned())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<StoredRecipe>, StoreError> {
        Ok(self.available()?.recipes.get(&id).cloned())
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<StoredRecipe>, StoreError> {
        let inner = self.available()?;
        Ok(inner
            .recipes
            .values()
            .rev()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        recipe: &Recipe,
        source_url: Option<&str>,
    ) -> Result<StoredRecipe, StoreError> {
        let mut inner = self.available()?;
        if let Some(url) = source_url {
            if inner.holder_of(url).is_some() {
                return Err(StoreError::Conflict(
                    "Duplicate value violates unique constraint: uq_recipes_source_url"
                        .to_string(),
                ));
            }
        }
        Ok(inner.insert(recipe, source_url))
    }

    async fn create_or_get(
        &self,
        recipe: &Recipe,
        source_url: &str,
    ) -> Result<InsertOutcome, StoreError> {
        let mut inner = self.available()?;
        if let Some(existing) = inner.holder_of(source_url) {
            return Ok(InsertOutcome {
                recipe: existing.clone(),
                created: false,
            });
        }
        Ok(InsertOutcome {
            recipe: inner.insert(recipe, Some(source_url)),
            created: true,
        })
    }

    async fn update(&self, id: DbId, recipe: &Recipe) -> Result<Option<StoredRecipe>, StoreError> {
        let mut inner = self.available()?;
        if !inner.recipes.contains_key(&id) {
            return Ok(None);
        }

        let ingredients = inner.ingredient_rows(id, recipe);
        let instructions = inner.instruction_rows(id, recipe);
        let fields = RecipeFields::from_recipe(recipe);

        let Some(stored) = inner.recipes.get_mut(&id) else {
            return Ok(None);
        };
        let row = &mut stored.recipe;
        row.title = fields.title.to_string();
        row.base_servings = fields.base_servings;
        row.prep_time = fields.prep_time.map(str::to_string);
        row.cook_time = fields.cook_time.map(str::to_string);
        row.difficulty = fields.difficulty.map(str::to_string);
        row.cuisine_type = fields.cuisine_type.map(str::to_string);
        row.updated_at = chrono::Utc::now();
        stored.ingredients = ingredients;
        stored.instructions = instructions;

        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(self.available()?.recipes.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.available().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn recipe(title: &str) -> Recipe {
        Recipe::from_json(&format!(
            r#"{{
                "recipe_overview": {{"title": "{title}", "servings": 2}},
                "ingredients": [{{"item": "rice", "amount": "1", "unit": "cup"}}],
                "instructions": ["Rinse", "Boil", "Rest"]
            }}"#
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn ids_are_sequential_and_list_is_newest_first() {
        let store = MemoryRecipeStore::new();
        let a = store.create(&recipe("A"), None).await.unwrap();
        let b = store.create(&recipe("B"), None).await.unwrap();
        assert_eq!(a.id() + 1, b.id());

        let listed = store.list(0, 10).await.unwrap();
        let titles: Vec<_> = listed.iter().map(|r| r.recipe.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn list_applies_skip_and_limit() {
        let store = MemoryRecipeStore::new();
        for i in 0..5 {
            store.create(&recipe(&format!("R{i}")), None).await.unwrap();
        }
        let page = store.list(2, 2).await.unwrap();
        let titles: Vec<_> = page.iter().map(|r| r.recipe.title.as_str()).collect();
        assert_eq!(titles, vec!["R2", "R1"]);
    }

    #[tokio::test]
    async fn duplicate_source_url_on_create_conflicts() {
        let store = MemoryRecipeStore::new();
        store
            .create(&recipe("A"), Some("https://example.com/a"))
            .await
            .unwrap();
        let err = store
            .create(&recipe("B"), Some("https://example.com/a"))
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::Conflict(_));
    }

    #[tokio::test]
    async fn create_or_get_returns_first_writer() {
        let store = MemoryRecipeStore::new();
        let first = store
            .create_or_get(&recipe("First"), "https://example.com/a")
            .await
            .unwrap();
        let second = store
            .create_or_get(&recipe("Second"), "https://example.com/a")
            .await
            .unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(second.recipe.id(), first.recipe.id());
        assert_eq!(second.recipe.recipe.title, "First");
        assert_eq!(store.count_by_source_url("https://example.com/a"), 1);
    }

    #[tokio::test]
    async fn source_url_lookup_is_exact() {
        let store = MemoryRecipeStore::new();
        store
            .create(&recipe("A"), Some("https://example.com/a"))
            .await
            .unwrap();
        assert!(store
            .find_by_source_url("https://example.com/a/")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_by_source_url("https://example.com/a?utm_source=x")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_replaces_children_and_keeps_source_url() {
        let store = MemoryRecipeStore::new();
        let created = store
            .create(&recipe("Old"), Some("https://example.com/a"))
            .await
            .unwrap();

        let mut replacement = recipe("New");
        replacement.instructions = vec!["Only step".to_string()];
        let updated = store
            .update(created.id(), &replacement)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.recipe.title, "New");
        assert_eq!(updated.instructions.len(), 1);
        assert_eq!(updated.instructions[0].step_number, 1);
        assert_eq!(updated.source_url(), Some("https://example.com/a"));
        assert!(store.update(999, &replacement).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_recipe() {
        let store = MemoryRecipeStore::new();
        let created = store.create(&recipe("A"), None).await.unwrap();
        assert!(store.delete(created.id()).await.unwrap());
        assert!(!store.delete(created.id()).await.unwrap());
        assert!(store.find_by_id(created.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = MemoryRecipeStore::new();
        store.set_unavailable(true);
        assert_matches!(
            store.find_by_source_url("https://example.com/a").await,
            Err(StoreError::Unavailable(_))
        );
        assert_matches!(store.health_check().await, Err(StoreError::Unavailable(_)));

        store.set_unavailable(false);
        assert!(store.health_check().await.is_ok());
    }
}
