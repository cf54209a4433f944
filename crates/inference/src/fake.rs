//! Scripted inference client for tests and offline runs.
//!
//! Replies are registered per video URL. Every call is recorded so tests
//! can assert how many times the model would have been invoked.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::{InferenceClient, InferenceError};

/// What the fake answers for one URL.
#[derive(Debug, Clone)]
pub enum FakeReply {
    /// Return this text as the model output.
    Payload(String),
    /// Fail the call with [`InferenceError::Scripted`].
    Fail(String),
    /// Fail the call with [`InferenceError::EmptyResponse`].
    Empty,
}

/// An [`InferenceClient`] that never leaves the process.
#[derive(Debug, Default)]
pub struct FakeInference {
    replies: RwLock<HashMap<String, FakeReply>>,
    default_reply: Option<FakeReply>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeInference {
    /// A fake with no scripted replies; unknown URLs fail.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fake that answers every URL with [`sample_recipe_payload`].
    pub fn with_sample_recipe() -> Self {
        Self::new().with_default_reply(FakeReply::Payload(sample_recipe_payload(
            "Garlic Butter Noodles",
        )))
    }

    /// Answer `video_url` with `payload`.
    pub fn with_payload(self, video_url: &str, payload: impl Into<String>) -> Self {
        self.add_reply(video_url, FakeReply::Payload(payload.into()));
        self
    }

    /// Fail calls for `video_url` with `message`.
    pub fn with_failure(self, video_url: &str, message: impl Into<String>) -> Self {
        self.add_reply(video_url, FakeReply::Fail(message.into()));
        self
    }

    /// Reply used when no URL-specific reply is registered.
    pub fn with_default_reply(mut self, reply: FakeReply) -> Self {
        self.default_reply = Some(reply);
        self
    }

    /// Sleep this long inside every call, to widen race windows in tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Register or replace the reply for `video_url`.
    pub fn add_reply(&self, video_url: &str, reply: FakeReply) {
        self.replies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(video_url.to_string(), reply);
    }

    /// Total number of calls so far.
    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of calls made for one URL.
    pub fn calls_for(&self, video_url: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|url| url.as_str() == video_url)
            .count()
    }

    fn reply_for(&self, video_url: &str) -> Option<FakeReply> {
        self.replies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(video_url)
            .cloned()
            .or_else(|| self.default_reply.clone())
    }
}

#[async_trait]
impl InferenceClient for FakeInference {
    async fn extract_recipe(&self, video_url: &str) -> Result<String, InferenceError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(video_url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.reply_for(video_url) {
            Some(FakeReply::Payload(text)) => Ok(text),
            Some(FakeReply::Fail(message)) => Err(InferenceError::Scripted(message)),
            Some(FakeReply::Empty) => Err(InferenceError::EmptyResponse),
            None => Err(InferenceError::NotConfigured(format!(
                "no scripted reply for {video_url}"
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}

/// A well-formed, valid recipe payload with the given title.
pub fn sample_recipe_payload(title: &str) -> String {
    serde_json::json!({
        "recipe_overview": {
            "title": title,
            "prep_time": "5 mins",
            "cook_time": "10 mins",
            "servings": 2,
            "difficulty": "Easy",
            "cuisine_type": "Asian Fusion"
        },
        "ingredients": [
            {"item": "noodles", "amount": "200", "unit": "g", "notes": null},
            {"item": "butter", "amount": "2", "unit": "tbsp", "notes": "unsalted"},
            {"item": "garlic", "amount": "4", "unit": "cloves", "notes": "minced"},
            {"item": "soy sauce", "amount": "1", "unit": "tbsp", "notes": null}
        ],
        "instructions": [
            "Cook the noodles until just tender",
            "Melt butter and fry the garlic until fragrant",
            "Toss noodles with garlic butter and soy sauce"
        ],
        "equipment": ["pot", "wok"]
    })
    .to_string()
}
