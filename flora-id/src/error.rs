//! Error types for flora-id HTTP handlers
//!
//! Every failure response uses the same body shape as success responses:
//! `{"status": "error", "message": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::AnalysisError;

/// Message returned when a POST carries no `file` field
pub const NO_SAMPLE_MESSAGE: &str = "未检测到样本";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// No sample uploaded (400)
    #[error("{}", NO_SAMPLE_MESSAGE)]
    MissingSample,

    /// Multipart stream could not be read, e.g. over the size cap (400)
    #[error("样本读取失败: {0}")]
    InvalidUpload(String),

    /// Sample could not be analyzed (500)
    #[error("科学分析失败: {0}")]
    Analysis(#[from] AnalysisError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingSample | ApiError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sample_is_bad_request() {
        let err = ApiError::MissingSample;
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "未检测到样本");
    }

    #[test]
    fn test_analysis_error_is_internal_with_prefix() {
        let err = ApiError::from(AnalysisError::ShapeMismatch {
            expected: 67,
            actual: 3,
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "科学分析失败: Model output shape mismatch: expected 67 scores, got 3"
        );
    }
}
