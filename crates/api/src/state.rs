use std::sync::Arc;

use chef_db::RecipeStore;
use chef_pipeline::DedupCache;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Recipe persistence, shared with the dedup cache.
    pub store: Arc<dyn RecipeStore>,
    /// Cached extraction entrypoint.
    pub dedup: Arc<DedupCache>,
}
