use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every response body has the shape `{ "error": "<message>" }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No file uploaded")]
    NoFileUploaded,

    #[error("Unsupported file type")]
    UnsupportedFileType,

    #[error("Validation error: {0}")]
    Validation(String),

    /// A malformed or oversized multipart stream. Keeps the rejection's status.
    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    /// Any failure inside the proposal pipeline after validation.
    /// The cause is logged where it happens and never exposed to the caller.
    #[error("Error processing document")]
    ProcessingFailed,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NoFileUploaded => (StatusCode::BAD_REQUEST, "No file uploaded".to_string()),
            AppError::UnsupportedFileType => {
                (StatusCode::BAD_REQUEST, "Unsupported file type".to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Multipart(e) => (e.status(), e.body_text()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Access denied".to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::ProcessingFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error processing document".to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_client_errors_render_fixed_messages() {
        let (status, body) = render(AppError::NoFileUploaded).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No file uploaded"}));

        let (status, body) = render(AppError::UnsupportedFileType).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Unsupported file type"}));
    }

    #[tokio::test]
    async fn test_internal_errors_hide_their_cause() {
        let (status, body) =
            render(AppError::Internal(anyhow::anyhow!("password=hunter2 leaked"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Server error"}));

        let (status, body) = render(AppError::ProcessingFailed).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Error processing document"}));
    }
}
