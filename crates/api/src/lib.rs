//! HTTP boundary of the recipe extraction service.
//!
//! Exposes config, state, error handling, and routes so integration tests
//! and the binary entrypoint build the same application.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod query;
pub mod router;
pub mod routes;
pub mod state;
