//! Shared domain types for the recipe extraction service.
//!
//! Holds the recipe artifact, the error taxonomy shared by every crate, and
//! the small parsing policies (ingredient amounts, source URL handles) that
//! both the store and the HTTP layer rely on.

pub mod amount;
pub mod error;
pub mod pagination;
pub mod recipe;
pub mod types;
pub mod validation;
pub mod video_url;
