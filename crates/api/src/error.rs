use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Map, Value};

use chef_core::error::CoreError;
use chef_core::types::DbId;
use chef_db::StoreError;
use chef_pipeline::PipelineError;

/// Application-level error type for HTTP handlers.
///
/// Wraps domain and store errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the JSON error envelope
/// `{ "success": false, "error": ..., "code": ..., "details"?: ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `chef_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A persistence error from `chef_db`.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Request validation findings, one message per failed rule.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The request body could not be read as JSON of the expected shape.
    #[error(transparent)]
    Json(#[from] JsonRejection),

    /// The query string could not be parsed.
    #[error(transparent)]
    Query(#[from] QueryRejection),

    /// The extraction workflow ended in `failed`.
    #[error("Recipe extraction failed: {original_error}")]
    ExtractionFailed {
        video_url: String,
        original_error: String,
        processing_time: f64,
    },

    /// The extraction succeeded but its result could not be looked up or
    /// stored.
    #[error("Recipe persistence failed: {original_error}")]
    ExtractionPersistence {
        video_url: String,
        original_error: String,
        processing_time: f64,
    },

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidRequest(core) => Self::Core(core),
            PipelineError::Store(store) => Self::Store(store),
            PipelineError::Transition(transition) => Self::InternalError(transition.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                    Some(id_details(entity, *id)),
                ),
                CoreError::Validation(msg) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "VALIDATION_ERROR",
                    msg.clone(),
                    Some(json!({ "errors": [msg] })),
                ),
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Store errors ---
            AppError::Store(err) => classify_store_error(err),

            // --- Request errors ---
            AppError::Validation(findings) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                "Request validation failed".to_string(),
                Some(json!({ "errors": findings })),
            ),
            AppError::Json(rejection) => (
                rejection.status(),
                "INVALID_BODY",
                rejection.body_text(),
                None,
            ),
            AppError::Query(rejection) => (
                rejection.status(),
                "INVALID_QUERY",
                rejection.body_text(),
                None,
            ),

            // --- Extraction errors ---
            AppError::ExtractionFailed {
                video_url,
                original_error,
                processing_time,
            } => (
                StatusCode::BAD_GATEWAY,
                "EXTRACTION_FAILED",
                "Recipe extraction failed".to_string(),
                Some(json!({
                    "processing_time": processing_time,
                    "video_url": video_url,
                    "original_error": original_error,
                })),
            ),
            AppError::ExtractionPersistence {
                video_url,
                original_error,
                processing_time,
            } => {
                tracing::error!(
                    video_url = %video_url,
                    error = %original_error,
                    "Extraction persistence failed"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "Failed to store or load the extracted recipe".to_string(),
                    Some(json!({
                        "processing_time": processing_time,
                        "video_url": video_url,
                        "original_error": original_error,
                    })),
                )
            }

            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let mut body = json!({
            "success": false,
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, axum::Json(body)).into_response()
    }
}

type ErrorParts = (StatusCode, &'static str, String, Option<Value>);

fn internal() -> ErrorParts {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
        None,
    )
}

/// `{ "<entity>_id": id }`, e.g. `{ "recipe_id": 7 }`.
fn id_details(entity: &str, id: DbId) -> Value {
    let mut details = Map::new();
    details.insert(format!("{}_id", entity.to_lowercase()), json!(id));
    Value::Object(details)
}

/// Classify a store error into an HTTP status, error code, and message.
///
/// - Unique constraint violations map to 409.
/// - An unreachable store maps to 503.
/// - Everything else maps to 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> ErrorParts {
    match err {
        StoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
        StoreError::Unavailable(msg) => {
            tracing::error!(error = %msg, "Store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "The recipe store is unavailable".to_string(),
                None,
            )
        }
        StoreError::Database(db_err) => {
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
    }
}
