use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::exam::marks::{describe, MarkMismatch};
use crate::exam::spec::SpecificationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed exam request, rejected before any model call.
    #[error("Invalid exam specification: {0}")]
    Specification(#[from] SpecificationError),

    /// Request body was not valid JSON for the endpoint's request type.
    #[error("Invalid request body: {0}")]
    InvalidRequest(#[from] JsonRejection),

    /// The proposed mark distribution did not fit the exam; the attempt was aborted.
    #[error("Marks didn't add up: {}", describe(.0))]
    MarkValidation(Vec<MarkMismatch>),

    /// Marks validated but the generation engine returned nothing usable.
    #[error("Generation engine returned nothing: {0}")]
    Generation(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Specification(e) => (
                StatusCode::BAD_REQUEST,
                "SPECIFICATION_ERROR",
                e.to_string(),
            ),
            AppError::InvalidRequest(rejection) => (
                StatusCode::BAD_REQUEST,
                "SPECIFICATION_ERROR",
                rejection.body_text(),
            ),
            AppError::MarkValidation(mismatches) => {
                tracing::warn!("Mark validation aborted paper: {}", describe(mismatches));
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "MARK_VALIDATION_FAILED",
                    format!(
                        "The question marks didn't add up to the requested paper: {}. \
                        Please try again.",
                        describe(mismatches)
                    ),
                )
            }
            AppError::Generation(msg) => {
                tracing::error!("Generation error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FAILED",
                    "The generation engine returned no paper content. Please try again."
                        .to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_validation_maps_to_422() {
        let err = AppError::MarkValidation(vec![MarkMismatch::Sum {
            expected: 10,
            actual: 9,
        }]);
        assert_eq!(
            err.to_string(),
            "Marks didn't add up: marks sum to 9 but the paper is worth 10"
        );
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_specification_error_maps_to_400() {
        let err: AppError = SpecificationError::MissingField("title").into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_generation_error_maps_to_502() {
        let err = AppError::Generation("empty paper".to_string());
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
