//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Pagination parameters (`?skip=&limit=`).
///
/// Values are clamped by the handler via `clamp_limit` / `clamp_offset`.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
