//! Extraction state and its status transition table.
//!
//! An [`ExtractionState`] is never mutated in place. Each step reads the
//! current value and returns a new one, and every status change is checked
//! against [`next_status`] before the new value is built.

use std::fmt;

use chef_core::error::CoreError;
use chef_core::recipe::Recipe;
use serde::Serialize;

/// Upper bound accepted for `max_retries`.
pub const MAX_RETRIES_LIMIT: i32 = 5;

/// `max_retries` used when the caller does not supply one.
pub const DEFAULT_MAX_RETRIES: i32 = 2;

// ---------------------------------------------------------------------------
// Status and events
// ---------------------------------------------------------------------------

/// Stage of one workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Pending,
    Running,
    Failed,
    Success,
}

impl ExtractionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Failed => "failed",
            Self::Success => "success",
        }
    }

    /// `failed` and `success` end a run.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Success)
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something a step reports that moves the status forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionEvent {
    /// The inference call produced a recipe of the right shape.
    Extracted,
    /// The inference call failed or produced an unusable payload.
    ExtractionFailed,
    /// Validation ran and the run should be reported as successful.
    Validated,
    /// Validation could not run, or the policy rejected the recipe.
    ValidationFailed,
}

impl fmt::Display for ExtractionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Extracted => "extracted",
            Self::ExtractionFailed => "extraction_failed",
            Self::Validated => "validated",
            Self::ValidationFailed => "validation_failed",
        };
        f.write_str(name)
    }
}

/// A status change that is not in the transition table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot apply '{event}' to an extraction in status '{from}'")]
pub struct TransitionError {
    pub from: ExtractionStatus,
    pub event: ExtractionEvent,
}

/// The transition table.
///
/// - `pending` + `extracted`         -> `running`
/// - `pending` + `extraction_failed` -> `failed`
/// - `running` + `validated`         -> `success`
/// - `running` + `validation_failed` -> `failed`
///
/// Terminal statuses accept no events.
pub fn next_status(from: ExtractionStatus, event: ExtractionEvent) -> Option<ExtractionStatus> {
    use ExtractionEvent as E;
    use ExtractionStatus as S;

    match (from, event) {
        (S::Pending, E::Extracted) => Some(S::Running),
        (S::Pending, E::ExtractionFailed) => Some(S::Failed),
        (S::Running, E::Validated) => Some(S::Success),
        (S::Running, E::ValidationFailed) => Some(S::Failed),
        _ => None,
    }
}

/// Like [`next_status`], but an illegal move is an error.
pub fn transition(
    from: ExtractionStatus,
    event: ExtractionEvent,
) -> Result<ExtractionStatus, TransitionError> {
    next_status(from, event).ok_or(TransitionError { from, event })
}

/// Reject a `max_retries` outside `0..=5`.
pub fn validate_max_retries(max_retries: i32) -> Result<(), CoreError> {
    if (0..=MAX_RETRIES_LIMIT).contains(&max_retries) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "max_retries must be between 0 and {MAX_RETRIES_LIMIT}, got {max_retries}"
        )))
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Per-request workflow state. Lives for one run and is never persisted.
///
/// `retry_count` and `max_retries` are carried through unchanged: the
/// workflow makes a single extraction attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionState {
    pub(crate) video_url: String,
    pub(crate) status: ExtractionStatus,
    pub(crate) extracted_recipe: Option<Recipe>,
    pub(crate) error_message: Option<String>,
    pub(crate) retry_count: i32,
    pub(crate) max_retries: i32,
    pub(crate) is_valid_recipe: bool,
    pub(crate) validation_errors: Option<Vec<String>>,
    pub(crate) number_of_steps: i32,
}

impl ExtractionState {
    /// A `pending` state for `video_url`.
    pub fn new(video_url: impl Into<String>, max_retries: i32) -> Result<Self, CoreError> {
        validate_max_retries(max_retries)?;
        Ok(Self {
            video_url: video_url.into(),
            status: ExtractionStatus::Pending,
            extracted_recipe: None,
            error_message: None,
            retry_count: 0,
            max_retries,
            is_valid_recipe: false,
            validation_errors: None,
            number_of_steps: 0,
        })
    }

    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    pub fn status(&self) -> ExtractionStatus {
        self.status
    }

    pub fn extracted_recipe(&self) -> Option<&Recipe> {
        self.extracted_recipe.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn retry_count(&self) -> i32 {
        self.retry_count
    }

    pub fn max_retries(&self) -> i32 {
        self.max_retries
    }

    pub fn is_valid_recipe(&self) -> bool {
        self.is_valid_recipe
    }

    pub fn validation_errors(&self) -> Option<&[String]> {
        self.validation_errors.as_deref()
    }

    pub fn number_of_steps(&self) -> i32 {
        self.number_of_steps
    }

    /// Copy of `self` moved forward by `event`, with one more step counted.
    fn advance(&self, event: ExtractionEvent) -> Result<Self, TransitionError> {
        let status = transition(self.status, event)?;
        Ok(Self {
            status,
            number_of_steps: self.number_of_steps + 1,
            ..self.clone()
        })
    }

    /// Extraction produced `recipe`.
    pub fn extracted(&self, recipe: Recipe) -> Result<Self, TransitionError> {
        let mut next = self.advance(ExtractionEvent::Extracted)?;
        next.extracted_recipe = Some(recipe);
        next.error_message = None;
        Ok(next)
    }

    /// Extraction failed with `reason`.
    pub fn extraction_failed(&self, reason: impl Into<String>) -> Result<Self, TransitionError> {
        let mut next = self.advance(ExtractionEvent::ExtractionFailed)?;
        next.extracted_recipe = None;
        next.error_message = Some(reason.into());
        Ok(next)
    }

    /// Validation ran and recorded `findings`; the run succeeds whatever
    /// they are. An empty list marks the recipe valid.
    pub fn validated(&self, findings: Vec<String>) -> Result<Self, TransitionError> {
        let mut next = self.advance(ExtractionEvent::Validated)?;
        next.record_findings(findings);
        Ok(next)
    }

    /// Validation ended the run as failed. `findings` may be empty when
    /// there was nothing to validate.
    pub fn validation_failed(
        &self,
        reason: impl Into<String>,
        findings: Vec<String>,
    ) -> Result<Self, TransitionError> {
        let mut next = self.advance(ExtractionEvent::ValidationFailed)?;
        next.record_findings(findings);
        next.is_valid_recipe = false;
        next.error_message = Some(reason.into());
        Ok(next)
    }

    fn record_findings(&mut self, findings: Vec<String>) {
        self.is_valid_recipe = findings.is_empty();
        self.validation_errors = if findings.is_empty() {
            None
        } else {
            Some(findings)
        };
    }
}
