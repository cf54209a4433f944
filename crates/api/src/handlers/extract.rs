//! Handlers for recipe extraction from video URLs.
//!
//! Both endpoints go through the dedup cache: a URL that already has a
//! stored recipe is answered from the store without calling the model.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use chef_core::recipe::Recipe;
use chef_core::types::DbId;
use chef_core::video_url::http_url;
use chef_pipeline::state::DEFAULT_MAX_RETRIES;
use chef_pipeline::{ExtractionOutcome, PipelineError};

use crate::error::{AppError, AppResult};
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Video used by `GET /extract/demo`.
pub const DEMO_VIDEO_URL: &str = "https://www.tiktok.com/@khanhong/video/7557275818255273234";

fn default_max_retries() -> i32 {
    DEFAULT_MAX_RETRIES
}

/// Body of `POST /extract`.
#[derive(Debug, Deserialize, Validate)]
pub struct ExtractRequest {
    #[validate(
        url(message = "video_url must be a valid URL"),
        custom(function = "http_url")
    )]
    pub video_url: String,
    #[serde(default = "default_max_retries")]
    #[validate(range(min = 0, max = 5, message = "max_retries must be between 0 and 5"))]
    pub max_retries: i32,
}

/// Extraction metadata reported next to the recipe.
#[derive(Debug, Serialize)]
pub struct ExtractMetadata {
    pub steps: i32,
    pub cached: bool,
    pub database_id: Option<DbId>,
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_valid: Option<bool>,
    #[serde(rename = "errors", skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<String>>,
}

/// Response of a successful extraction.
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub recipe: Option<Recipe>,
    pub metadata: ExtractMetadata,
    /// Wall-clock seconds spent serving the request.
    pub processing_time: f64,
}

impl ExtractResponse {
    fn from_outcome(outcome: ExtractionOutcome, processing_time: f64) -> Self {
        Self {
            success: outcome.success,
            recipe: outcome.recipe,
            metadata: ExtractMetadata {
                steps: outcome.steps,
                cached: outcome.cached,
                database_id: outcome.database_id,
                creator: outcome.creator,
                is_valid: outcome.is_valid,
                validation_errors: outcome.validation_errors,
            },
            processing_time,
        }
    }
}

// ---------------------------------------------------------------------------
// POST /extract
// ---------------------------------------------------------------------------

/// Extract a recipe from a cooking video URL.
pub async fn extract_recipe(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ExtractRequest>,
) -> AppResult<Json<ExtractResponse>> {
    run_extraction(&state, &input.video_url, input.max_retries).await
}

// ---------------------------------------------------------------------------
// GET /extract/demo
// ---------------------------------------------------------------------------

/// Extract the recipe of a fixed sample video.
pub async fn extract_demo(State(state): State<AppState>) -> AppResult<Json<ExtractResponse>> {
    run_extraction(&state, DEMO_VIDEO_URL, DEFAULT_MAX_RETRIES).await
}

async fn run_extraction(
    state: &AppState,
    video_url: &str,
    max_retries: i32,
) -> AppResult<Json<ExtractResponse>> {
    let started = Instant::now();
    tracing::info!(video_url, max_retries, "Extraction requested");

    let outcome = match state.dedup.extract(video_url, max_retries).await {
        Ok(outcome) => outcome,
        Err(PipelineError::InvalidRequest(err)) => return Err(AppError::Core(err)),
        Err(err) => {
            return Err(AppError::ExtractionPersistence {
                video_url: video_url.to_string(),
                original_error: err.to_string(),
                processing_time: started.elapsed().as_secs_f64(),
            })
        }
    };
    let processing_time = started.elapsed().as_secs_f64();

    if !outcome.success {
        return Err(AppError::ExtractionFailed {
            video_url: video_url.to_string(),
            original_error: outcome
                .error
                .unwrap_or_else(|| "Unknown extraction error".to_string()),
            processing_time,
        });
    }

    tracing::info!(
        video_url,
        recipe_id = ?outcome.database_id,
        cached = outcome.cached,
        steps = outcome.steps,
        processing_time,
        "Extraction complete"
    );
    Ok(Json(ExtractResponse::from_outcome(outcome, processing_time)))
}
