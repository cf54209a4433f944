//! Client side of the multimodal inference service.
//!
//! An [`InferenceClient`] turns a video URL into a raw JSON payload that is
//! expected to describe a recipe. Parsing and shape checks belong to the
//! caller; this crate only moves bytes and reports transport failures.

pub mod fake;
pub mod gemini;
pub mod prompt;

pub use fake::{sample_recipe_payload, FakeInference, FakeReply};
pub use gemini::{GeminiClient, GeminiConfig};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// Errors raised while talking to the inference service.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Inference API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered but produced no text.
    #[error("Empty response from inference service")]
    EmptyResponse,

    /// The call did not finish before the caller's deadline
    /// (`INFERENCE_TIMEOUT_SECS`, enforced by the extraction step).
    #[error("Inference timed out after {0:?}")]
    Timeout(Duration),

    /// The client is missing configuration (API key, provider name).
    #[error("Inference provider not configured: {0}")]
    NotConfigured(String),

    /// A scripted failure from [`FakeInference`].
    #[error("{0}")]
    Scripted(String),
}

/// A multimodal model that can watch a cooking video and describe it.
///
/// Implementations must be thread-safe; one client is shared by every
/// request.
#[async_trait]
pub trait InferenceClient: Send + Sync + fmt::Debug {
    /// Ask the model for a recipe describing `video_url`. Returns the raw
    /// response text, which should be JSON in the recipe shape.
    async fn extract_recipe(&self, video_url: &str) -> Result<String, InferenceError>;

    /// Provider name (e.g. "gemini", "fake").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g. "gemini-2.5-flash").
    fn model_name(&self) -> &str;
}

/// Build the configured client.
///
/// - `INFERENCE_PROVIDER`: "gemini" (default) | "fake"
/// - Gemini settings are read by [`GeminiConfig::from_env`].
pub fn create_client_from_env() -> Result<Arc<dyn InferenceClient>, InferenceError> {
    let provider = std::env::var("INFERENCE_PROVIDER").unwrap_or_else(|_| "gemini".to_string());

    match provider.as_str() {
        "gemini" => {
            let config = GeminiConfig::from_env()?;
            Ok(Arc::new(GeminiClient::new(config)))
        }
        "fake" => Ok(Arc::new(FakeInference::with_sample_recipe())),
        other => Err(InferenceError::NotConfigured(format!(
            "Unknown inference provider: {other}"
        ))),
    }
}
