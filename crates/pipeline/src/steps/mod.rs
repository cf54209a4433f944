//! The two workflow steps. Each takes the current state and returns a new
//! one; neither touches persistence.

pub mod extraction;
pub mod validation;

pub use extraction::ExtractionStep;
pub use validation::{ValidationPolicy, ValidationStep};
