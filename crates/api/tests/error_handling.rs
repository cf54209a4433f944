//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no router is
//! involved.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chef_api::error::AppError;
use chef_core::error::CoreError;
use chef_db::StoreError;
use http_body_util::BodyExt;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: CoreError::NotFound maps to 404 with the id in details
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Recipe",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Recipe with id 42 not found");
    assert_eq!(json["details"]["recipe_id"], 42);
}

// ---------------------------------------------------------------------------
// Test: validation errors map to 422
// ---------------------------------------------------------------------------

#[tokio::test]
async fn core_validation_error_returns_422() {
    let err = AppError::Core(CoreError::Validation("max_retries out of range".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "max_retries out of range");
    assert_eq!(json["details"]["errors"][0], "max_retries out of range");
}

#[tokio::test]
async fn request_validation_lists_every_finding() {
    let err = AppError::Validation(vec![
        "recipe.overview.servings: servings must be at least 1".into(),
        "recipe.overview.title: title must not be empty".into(),
    ]);

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["details"]["errors"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Test: conflicts map to 409
// ---------------------------------------------------------------------------

#[tokio::test]
async fn conflict_error_returns_409() {
    let (status, json) = error_to_response(AppError::Core(CoreError::Conflict(
        "duplicate source_url".into(),
    )))
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");

    let (status, _) =
        error_to_response(AppError::Store(StoreError::Conflict("taken".into()))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Test: store outages map to 503
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unavailable_store_returns_503() {
    let err = AppError::Store(StoreError::Unavailable("connection refused".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "SERVICE_UNAVAILABLE");
    assert!(!json["error"].as_str().unwrap().contains("refused"));
}

// ---------------------------------------------------------------------------
// Test: extraction errors carry request details
// ---------------------------------------------------------------------------

#[tokio::test]
async fn extraction_failed_returns_502_with_details() {
    let err = AppError::ExtractionFailed {
        video_url: "https://example.com/v".into(),
        original_error: "Inference timed out after 120s".into(),
        processing_time: 1.5,
    };

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "EXTRACTION_FAILED");
    assert_eq!(json["details"]["video_url"], "https://example.com/v");
    assert_eq!(
        json["details"]["original_error"],
        "Inference timed out after 120s"
    );
    assert_eq!(json["details"]["processing_time"], 1.5);
}

#[tokio::test]
async fn extraction_persistence_returns_500() {
    let err = AppError::ExtractionPersistence {
        video_url: "https://example.com/v".into(),
        original_error: "Store unavailable".into(),
        processing_time: 0.25,
    };

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "PERSISTENCE_ERROR");
    assert_eq!(json["details"]["original_error"], "Store unavailable");
}

// ---------------------------------------------------------------------------
// Test: internal errors are sanitized
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_error_hides_message() {
    let err = AppError::InternalError("secret stack trace".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
