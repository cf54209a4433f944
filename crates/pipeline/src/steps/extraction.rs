//! Wraps one call to the inference service.

use std::sync::Arc;
use std::time::Duration;

use chef_core::recipe::Recipe;
use chef_inference::{InferenceClient, InferenceError};

use crate::state::{ExtractionState, TransitionError};

/// Failure message when the service answers with nothing.
pub const EMPTY_RESPONSE: &str = "Empty response from inference service";

/// Failure message prefix when the answer is not JSON.
pub const INVALID_JSON: &str = "Inference service returned invalid JSON";

/// Failure message prefix when the JSON is not a recipe.
pub const SCHEMA_MISMATCH: &str = "Response did not match recipe schema";

/// Calls the inference service exactly once per run and folds every kind of
/// failure into a `failed` state with a message.
#[derive(Debug, Clone)]
pub struct ExtractionStep {
    client: Arc<dyn InferenceClient>,
    timeout: Duration,
}

impl ExtractionStep {
    pub fn new(client: Arc<dyn InferenceClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn run(&self, state: &ExtractionState) -> Result<ExtractionState, TransitionError> {
        let video_url = state.video_url();
        tracing::info!(
            video_url,
            provider = self.client.provider_name(),
            "Extracting recipe"
        );

        match self.fetch_candidate(video_url).await {
            Ok(recipe) => {
                tracing::info!(video_url, title = %recipe.overview.title, "Extraction successful");
                state.extracted(recipe)
            }
            Err(reason) => {
                tracing::error!(video_url, error = %reason, "Extraction failed");
                state.extraction_failed(reason)
            }
        }
    }

    async fn fetch_candidate(&self, video_url: &str) -> Result<Recipe, String> {
        let payload =
            match tokio::time::timeout(self.timeout, self.client.extract_recipe(video_url)).await {
                Err(_) => return Err(InferenceError::Timeout(self.timeout).to_string()),
                Ok(Err(InferenceError::EmptyResponse)) => return Err(EMPTY_RESPONSE.to_string()),
                Ok(Err(e)) => return Err(e.to_string()),
                Ok(Ok(payload)) => payload,
            };

        if payload.trim().is_empty() {
            return Err(EMPTY_RESPONSE.to_string());
        }

        Recipe::from_json(&payload).map_err(|e| {
            if e.is_data() {
                format!("{SCHEMA_MISMATCH}: {e}")
            } else {
                format!("{INVALID_JSON}: {e}")
            }
        })
    }
}
