//! Re-checks the extracted recipe and records findings on the state.

use crate::state::{ExtractionState, TransitionError};

/// Message recorded when validation is reached without a recipe.
pub const NO_RECIPE: &str = "no recipe data to validate";

/// Whether an invalid recipe should fail the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Record findings and report success regardless.
    #[default]
    RecordOnly,
    /// Fail the run when there are findings.
    RejectInvalid,
}

impl ValidationPolicy {
    /// `true` selects [`ValidationPolicy::RejectInvalid`].
    pub fn from_reject_flag(reject_invalid: bool) -> Self {
        if reject_invalid {
            Self::RejectInvalid
        } else {
            Self::RecordOnly
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationStep {
    policy: ValidationPolicy,
}

impl ValidationStep {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn run(&self, state: &ExtractionState) -> Result<ExtractionState, TransitionError> {
        let Some(recipe) = state.extracted_recipe() else {
            tracing::warn!(video_url = state.video_url(), "Validation reached without a recipe");
            return state.validation_failed(NO_RECIPE, Vec::new());
        };

        let findings = recipe.check();
        if findings.is_empty() {
            tracing::info!(video_url = state.video_url(), "Recipe is valid");
            return state.validated(findings);
        }

        tracing::warn!(
            video_url = state.video_url(),
            findings = ?findings,
            "Recipe has validation findings"
        );
        match self.policy {
            ValidationPolicy::RecordOnly => state.validated(findings),
            ValidationPolicy::RejectInvalid => {
                let reason = format!("Recipe failed validation: {}", findings.join("; "));
                state.validation_failed(reason, findings)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chef_core::recipe::Recipe;

    use crate::state::ExtractionStatus;

    fn running(payload: &str) -> ExtractionState {
        ExtractionState::new("https://example.com/a", 2)
            .unwrap()
            .extracted(Recipe::from_json(payload).unwrap())
            .unwrap()
    }

    const VALID: &str = r#"{
        "recipe_overview": {"title": "Rice", "servings": 2},
        "ingredients": [{"item": "rice", "amount": "1", "unit": "cup"}],
        "instructions": ["Boil"]
    }"#;

    const ZERO_SERVINGS: &str = r#"{
        "recipe_overview": {"title": "Rice", "servings": 0},
        "ingredients": [],
        "instructions": ["Boil"]
    }"#;

    #[test]
    fn valid_recipe_succeeds_without_findings() {
        let state = ValidationStep::default().run(&running(VALID)).unwrap();
        assert_eq!(state.status(), ExtractionStatus::Success);
        assert!(state.is_valid_recipe());
        assert!(state.validation_errors().is_none());
    }

    #[test]
    fn missing_optional_fields_do_not_count_as_findings() {
        // No difficulty, cuisine_type, prep_time, or cook_time.
        let state = ValidationStep::default().run(&running(VALID)).unwrap();
        assert!(state.is_valid_recipe());
    }

    #[test]
    fn record_only_succeeds_with_findings() {
        let state = ValidationStep::default()
            .run(&running(ZERO_SERVINGS))
            .unwrap();
        assert_eq!(state.status(), ExtractionStatus::Success);
        assert!(!state.is_valid_recipe());
        assert!(state.validation_errors().unwrap()[0].contains("servings"));
        assert!(state.error_message().is_none());
    }

    #[test]
    fn reject_invalid_fails_with_findings() {
        let state = ValidationStep::new(ValidationPolicy::RejectInvalid)
            .run(&running(ZERO_SERVINGS))
            .unwrap();
        assert_eq!(state.status(), ExtractionStatus::Failed);
        assert!(!state.is_valid_recipe());
        assert!(state.error_message().unwrap().contains("servings"));
        // The candidate is kept for inspection.
        assert!(state.extracted_recipe().is_some());
    }

    #[test]
    fn reject_invalid_passes_valid_recipes() {
        let state = ValidationStep::new(ValidationPolicy::RejectInvalid)
            .run(&running(VALID))
            .unwrap();
        assert_eq!(state.status(), ExtractionStatus::Success);
    }

    #[test]
    fn running_state_without_recipe_fails() {
        let mut state = running(VALID);
        state.extracted_recipe = None;

        let state = ValidationStep::default().run(&state).unwrap();
        assert_eq!(state.status(), ExtractionStatus::Failed);
        assert!(!state.is_valid_recipe());
        assert_eq!(state.error_message(), Some(NO_RECIPE));
    }

    #[test]
    fn reject_flag_selects_policy() {
        assert_eq!(
            ValidationPolicy::from_reject_flag(true),
            ValidationPolicy::RejectInvalid
        );
        assert_eq!(
            ValidationPolicy::from_reject_flag(false),
            ValidationPolicy::RecordOnly
        );
    }
}
