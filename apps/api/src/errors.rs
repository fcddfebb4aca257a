use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::AnalysisError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`;
/// every failure becomes an inline JSON message, never a crash.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Analysis(e) => match e {
                AnalysisError::UnsupportedProvider(_) => StatusCode::BAD_REQUEST,
                AnalysisError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                AnalysisError::CredentialInvalid(_)
                | AnalysisError::MalformedResponse(_)
                | AnalysisError::NetworkFailure(_) => StatusCode::BAD_GATEWAY,
            },
            AppError::Extraction(e) => match e {
                ExtractionError::UnsupportedDocumentFormat(_) => {
                    StatusCode::UNSUPPORTED_MEDIA_TYPE
                }
                ExtractionError::DocumentUnreadable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            },
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Analysis(e) => e.code(),
            AppError::Extraction(e) => e.code(),
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            AppError::Analysis(e) => {
                tracing::warn!(code = e.code(), "Analysis error: {e}");
                self.to_string()
            }
            AppError::Extraction(e) => {
                tracing::warn!(code = e.code(), "Extraction error: {e}");
                self.to_string()
            }
            AppError::NotFound(msg) | AppError::Validation(msg) => msg.clone(),
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unsupported_provider_is_bad_request() {
        let (status, body) = render(AnalysisError::UnsupportedProvider("x".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_PROVIDER");
        assert_eq!(body["error"]["message"], "Unsupported provider 'x'");
    }

    #[tokio::test]
    async fn test_rate_limited_is_429() {
        let (status, body) = render(AnalysisError::RateLimited("wait".into()).into()).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["code"], "RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_provider_outage_is_bad_gateway() {
        let err = AnalysisError::NetworkFailure("status 503: down".into());
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "NETWORK_FAILURE");
    }

    #[tokio::test]
    async fn test_unsupported_document_is_415() {
        let err = ExtractionError::UnsupportedDocumentFormat("rtf".into());
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_DOCUMENT_FORMAT");
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (status, body) = render(anyhow::anyhow!("secret detail").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "An internal server error occurred");
    }
}
