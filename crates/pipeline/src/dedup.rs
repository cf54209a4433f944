//! Source-URL dedup cache in front of the workflow.
//!
//! A URL that already has a stored recipe never reaches the inference
//! service again. Requests for the same URL are serialized by a per-key
//! lock held from lookup through insert, so concurrent first requests run
//! the workflow once: the first task to take the lock extracts and stores,
//! the rest find its row. Across processes the store's unique `source_url`
//! settles the race instead, and the first committed row wins.

use std::sync::Arc;

use chef_core::recipe::Recipe;
use chef_core::types::DbId;
use chef_core::video_url::creator_handle;
use chef_db::RecipeStore;
use serde::Serialize;

use crate::engine::WorkflowEngine;
use crate::error::PipelineError;
use crate::locks::KeyedLocks;
use crate::state::{validate_max_retries, ExtractionState, ExtractionStatus};

/// What one extraction request produced.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutcome {
    pub success: bool,
    pub recipe: Option<Recipe>,
    /// `true` when the recipe came from the store without running the
    /// workflow.
    pub cached: bool,
    pub database_id: Option<DbId>,
    /// Workflow steps executed for this request; 0 on a cache hit.
    pub steps: i32,
    /// Validation result; `None` when validation did not run.
    pub is_valid: Option<bool>,
    pub validation_errors: Option<Vec<String>>,
    /// `@username` parsed from the URL, if it has one.
    pub creator: Option<String>,
    /// Failure reason when `success` is `false`.
    pub error: Option<String>,
}

impl ExtractionOutcome {
    fn hit(video_url: &str, recipe: Recipe) -> Self {
        Self {
            success: true,
            database_id: recipe.id,
            recipe: Some(recipe),
            cached: true,
            steps: 0,
            is_valid: None,
            validation_errors: None,
            creator: creator_handle(video_url),
            error: None,
        }
    }

    fn from_state(state: &ExtractionState) -> Self {
        let validated = state.status() == ExtractionStatus::Success
            || state.validation_errors().is_some();
        Self {
            success: state.status() == ExtractionStatus::Success,
            recipe: None,
            cached: false,
            database_id: None,
            steps: state.number_of_steps(),
            is_valid: validated.then(|| state.is_valid_recipe()),
            validation_errors: state.validation_errors().map(<[String]>::to_vec),
            creator: creator_handle(state.video_url()),
            error: state.error_message().map(str::to_string),
        }
    }
}

/// Persistence-backed gate that decides whether the workflow runs.
pub struct DedupCache {
    store: Arc<dyn RecipeStore>,
    engine: WorkflowEngine,
    locks: KeyedLocks,
}

impl DedupCache {
    pub fn new(store: Arc<dyn RecipeStore>, engine: WorkflowEngine) -> Self {
        Self {
            store,
            engine,
            locks: KeyedLocks::new(),
        }
    }

    /// Stored recipe for exactly `source_url`, if any.
    pub async fn lookup(&self, source_url: &str) -> Result<Option<Recipe>, PipelineError> {
        let stored = self.store.find_by_source_url(source_url).await?;
        Ok(stored.map(|s| s.to_recipe()))
    }

    /// Return the stored recipe for `video_url`, or run the workflow and
    /// store its result.
    ///
    /// A failed run is an `Ok` outcome with `success == false` and nothing
    /// stored. Store failures are errors.
    pub async fn extract(
        &self,
        video_url: &str,
        max_retries: i32,
    ) -> Result<ExtractionOutcome, PipelineError> {
        validate_max_retries(max_retries)?;

        let _guard = self.locks.lock(video_url).await;

        if let Some(recipe) = self.lookup(video_url).await? {
            tracing::info!(video_url, recipe_id = ?recipe.id, cached = true, "Cache hit");
            return Ok(ExtractionOutcome::hit(video_url, recipe));
        }

        tracing::info!(video_url, cached = false, "Cache miss, running workflow");
        let state = self.engine.run(video_url, max_retries).await?;
        let mut outcome = ExtractionOutcome::from_state(&state);

        if state.status() != ExtractionStatus::Success {
            tracing::warn!(
                video_url,
                status = %state.status(),
                error = ?state.error_message(),
                "Workflow did not succeed, nothing stored"
            );
            return Ok(outcome);
        }

        let Some(recipe) = state.extracted_recipe() else {
            return Ok(outcome);
        };

        let inserted = self.store.create_or_get(recipe, video_url).await?;
        if inserted.created {
            tracing::info!(
                video_url,
                recipe_id = inserted.recipe.id(),
                "Stored extracted recipe"
            );
        } else {
            // Another process committed this URL between lookup and insert.
            tracing::warn!(
                video_url,
                recipe_id = inserted.recipe.id(),
                "Recipe for URL already stored, returning existing row"
            );
            outcome.cached = true;
        }

        outcome.database_id = Some(inserted.recipe.id());
        outcome.recipe = Some(inserted.recipe.to_recipe());
        Ok(outcome)
    }
}
