//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly; no server is involved.

use adpilot_api::error::AppError;
use adpilot_core::error::{CoreError, FieldError};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;

/// Convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Campaign",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["message"], "Campaign with id 42 not found");
}

#[tokio::test]
async fn invalid_fields_carry_errors_array() {
    let err = AppError::Core(CoreError::InvalidFields(vec![FieldError::new(
        "budget",
        "budget must be non-negative",
    )]));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "Validation failed");
    assert_eq!(json["errors"][0]["field"], "budget");
    assert_eq!(json["errors"][0]["message"], "budget must be non-negative");
}

#[tokio::test]
async fn plain_errors_omit_errors_array() {
    let (status, json) = error_to_response(AppError::BadRequest("bad json".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json.get("errors").is_none());
}

#[tokio::test]
async fn access_errors_map_to_401_and_403() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Unauthorized("no token".into()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Forbidden("not yours".into()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "not yours");
}

#[tokio::test]
async fn conflict_and_unavailable_map_to_409_and_503() {
    let (status, _) =
        error_to_response(AppError::Core(CoreError::Conflict("only drafts".into()))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = error_to_response(AppError::Core(CoreError::ServiceUnavailable(
        "AI service is not configured".into(),
    )))
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Internal("connection refused on 10.0.0.3".into()))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["message"], "An internal error occurred");

    let (_, json) = error_to_response(AppError::InternalError("secret detail".into())).await;
    assert_eq!(json["message"], "An internal error occurred");
}
