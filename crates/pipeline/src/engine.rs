//! Single-pass workflow: extraction, then validation if extraction worked.

use std::sync::Arc;
use std::time::Duration;

use chef_inference::InferenceClient;

use crate::error::PipelineError;
use crate::state::{ExtractionState, ExtractionStatus};
use crate::steps::{ExtractionStep, ValidationPolicy, ValidationStep};

/// Runs one extraction attempt and returns a terminal state.
///
/// There is no loop: `retry_count` and `max_retries` pass through
/// untouched.
#[derive(Debug, Clone)]
pub struct WorkflowEngine {
    extraction: ExtractionStep,
    validation: ValidationStep,
}

impl WorkflowEngine {
    pub fn new(extraction: ExtractionStep, validation: ValidationStep) -> Self {
        Self {
            extraction,
            validation,
        }
    }

    /// Build both steps from a client, an inference timeout, and a policy.
    pub fn from_client(
        client: Arc<dyn InferenceClient>,
        inference_timeout: Duration,
        policy: ValidationPolicy,
    ) -> Self {
        Self::new(
            ExtractionStep::new(client, inference_timeout),
            ValidationStep::new(policy),
        )
    }

    /// Run the workflow for `video_url` and return the terminal state.
    pub async fn run(
        &self,
        video_url: &str,
        max_retries: i32,
    ) -> Result<ExtractionState, PipelineError> {
        let initial = ExtractionState::new(video_url, max_retries)?;
        let (extracted, validated) = self.advance(&initial).await?;
        let state = validated.unwrap_or(extracted);

        tracing::debug!(
            video_url,
            status = %state.status(),
            steps = state.number_of_steps(),
            "Workflow finished"
        );
        Ok(state)
    }

    /// Like [`run`](Self::run), but returns every state the run passed
    /// through, starting with the initial `pending` one.
    pub async fn run_with_trace(
        &self,
        video_url: &str,
        max_retries: i32,
    ) -> Result<Vec<ExtractionState>, PipelineError> {
        let initial = ExtractionState::new(video_url, max_retries)?;
        let (extracted, validated) = self.advance(&initial).await?;

        let mut trace = vec![initial, extracted];
        trace.extend(validated);
        Ok(trace)
    }

    /// Extraction, then validation only if extraction left the run `running`.
    async fn advance(
        &self,
        initial: &ExtractionState,
    ) -> Result<(ExtractionState, Option<ExtractionState>), PipelineError> {
        let extracted = self.extraction.run(initial).await?;
        let validated = if extracted.status() == ExtractionStatus::Running {
            Some(self.validation.run(&extracted)?)
        } else {
            None
        };
        Ok((extracted, validated))
    }
}
