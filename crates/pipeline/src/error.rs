use chef_core::error::CoreError;
use chef_db::StoreError;

use crate::state::TransitionError;

/// Errors that escape the workflow boundary.
///
/// Step failures are not errors: they are recorded as a `failed` terminal
/// state. Only bad input, out-of-table transitions, and persistence
/// failures surface here.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidRequest(#[from] CoreError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
