//! Recipe extraction workflow and the source-URL dedup cache in front of it.
//!
//! A request flows through [`DedupCache::extract`]: a stored recipe for the
//! same URL is returned as-is, otherwise the [`WorkflowEngine`] runs the
//! extraction and validation steps once and a successful result is
//! persisted.

pub mod dedup;
pub mod engine;
pub mod error;
pub mod locks;
pub mod state;
pub mod steps;

pub use dedup::{DedupCache, ExtractionOutcome};
pub use engine::WorkflowEngine;
pub use error::PipelineError;
pub use state::{ExtractionEvent, ExtractionState, ExtractionStatus, TransitionError};
pub use steps::{ExtractionStep, ValidationPolicy, ValidationStep};
