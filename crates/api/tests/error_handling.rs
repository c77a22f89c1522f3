//! `AppError` to HTTP response mapping. No server or database needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use gigboard_api::error::AppError;
use gigboard_core::error::CoreError;
use gigboard_db::DbError;
use http_body_util::BodyExt;

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
        entity: "Contract",
        id: 42,
    });
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Contract with id 42 not found");
}

#[tokio::test]
async fn invalid_state_returns_409_with_its_own_code() {
    let err = AppError::Core(CoreError::invalid_state("Contract is disputed"));
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "INVALID_STATE");
    assert_eq!(json["error"], "Contract is disputed");
}

#[tokio::test]
async fn conflict_returns_409() {
    let err = AppError::Core(CoreError::conflict("Already reviewed"));
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn invalid_argument_returns_400() {
    let err = AppError::Core(CoreError::invalid_argument("Rating must be between 1 and 5"));
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn insufficient_funds_returns_422() {
    let err = AppError::Core(CoreError::InsufficientFunds {
        requested: 100,
        available: 50,
    });
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "INSUFFICIENT_FUNDS");
    assert_eq!(
        json["error"],
        "Insufficient funds: requested 100, available 50"
    );
}

#[tokio::test]
async fn forbidden_and_unauthorized_are_distinct() {
    let (status, json) = error_to_response(AppError::Core(CoreError::forbidden("Not yours"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Unauthorized("No token".into()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn db_error_unwraps_domain_errors() {
    let err: AppError = DbError::Core(CoreError::forbidden("Only the owner")).into();
    let (status, _) = error_to_response(err).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let err: AppError = DbError::Sqlx(sqlx::Error::RowNotFound).into();
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn internal_error_is_sanitized() {
    let err = AppError::InternalError("connection string leaked".into());
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");

    let err = AppError::Core(CoreError::Internal("bad status id 9".into()));
    let (_, json) = error_to_response(err).await;
    assert_eq!(json["error"], "An internal error occurred");
}
