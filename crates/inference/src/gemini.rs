//! REST client for the Gemini `generateContent` endpoint.
//!
//! Sends the chef prompt with the video URL and asks for a JSON answer in
//! the recipe schema. The raw answer text is returned unparsed. The call
//! itself has no deadline; the extraction step bounds it.

use async_trait::async_trait;
use serde::Deserialize;

use crate::prompt::{recipe_prompt, recipe_response_schema};
use crate::{InferenceClient, InferenceError};

/// Default public endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Sampling temperature. Kept low so repeated runs stay close.
const TEMPERATURE: f64 = 0.2;

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    /// Read settings from the environment.
    ///
    /// | Env var                  | Default            |
    /// |--------------------------|--------------------|
    /// | `GEMINI_API_KEY`         | required           |
    /// | `GEMINI_MODEL`           | `gemini-2.5-flash` |
    /// | `GEMINI_BASE_URL`        | Google endpoint    |
    pub fn from_env() -> Result<Self, InferenceError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| InferenceError::NotConfigured("GEMINI_API_KEY is not set".into()))?;

        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        Ok(Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// HTTP client for the Gemini API.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    /// Check the response status and decode the body.
    async fn parse_response(
        response: reqwest::Response,
    ) -> Result<GenerateContentResponse, InferenceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl InferenceClient for GeminiClient {
    async fn extract_recipe(&self, video_url: &str) -> Result<String, InferenceError> {
        tracing::info!(video_url, model = %self.config.model, "Calling Gemini");

        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": recipe_prompt(video_url) }],
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseJsonSchema": recipe_response_schema(),
                "temperature": TEMPERATURE,
            },
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed = Self::parse_response(response).await?;
        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(InferenceError::EmptyResponse);
        }
        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// ---------------------------------------------------------------------------
// Response shape
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
