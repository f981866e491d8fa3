use super::*;
use axum::body::to_bytes;
use axum::response::IntoResponse;

/// Helper to extract status code and body JSON from an ApiError response
async fn error_response(error: ApiError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_database_error_hides_details() {
    let error = ApiError::Database(anyhow::anyhow!("connection refused"));
    let (status, body) = error_response(error).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn test_not_found_response() {
    let (status, body) = error_response(ApiError::NotFound).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_auth_responses() {
    let (status, _) = error_response(ApiError::Unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = error_response(ApiError::Forbidden).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_validation_response_carries_message() {
    let msg = "Password must be at least 8 characters".to_string();
    let (status, body) = error_response(ApiError::Validation(msg.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], msg);
}

#[tokio::test]
async fn test_repo_errors_map_to_status_codes() {
    let not_found: ApiError = anyhow::Error::new(RepoError::NotFound("Shoe".to_string())).into();
    assert!(matches!(not_found, ApiError::NotFound));

    let validation: ApiError = anyhow::Error::new(RepoError::Validation("bad".to_string())).into();
    assert!(matches!(validation, ApiError::Validation(ref m) if m == "bad"));

    let transition: ApiError = anyhow::Error::new(RepoError::InvalidTransition {
        from: "processed".to_string(),
        to: "submitted".to_string(),
    })
    .into();
    let (status, body) = error_response(transition).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("processed"));

    let stock: ApiError = anyhow::Error::new(RepoError::InsufficientStock {
        shoe_id: "s1".to_string(),
        requested: 2,
        available: 1,
    })
    .into();
    let (status, _) = error_response(stock).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_context_wrapped_repo_error_still_maps() {
    let err = anyhow::Error::new(RepoError::Conflict("Email already registered".to_string()))
        .context("while registering");
    let api: ApiError = err.into();
    assert!(matches!(api, ApiError::Conflict(_)));
}

#[tokio::test]
async fn test_unknown_errors_become_internal() {
    let api: ApiError = anyhow::anyhow!("disk on fire").into();
    assert!(matches!(api, ApiError::Database(_)));
}

#[tokio::test]
async fn test_storage_errors_map_to_status_codes() {
    let (status, body) = error_response(StorageError::UnsupportedType("text/html".to_string()).into()).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["error"].as_str().unwrap().contains("text/html"));

    let (status, _) = error_response(StorageError::TooLarge { limit: 10 }.into()).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (status, _) = error_response(StorageError::InvalidKey("../x".to_string()).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = error_response(StorageError::NotFound("k".to_string()).into()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let (status, body) = error_response(StorageError::Io(io).into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}
