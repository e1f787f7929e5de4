use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Public application error type for the HTTP boundary.
///
/// Provider failures deliberately have no variant here: the pipeline
/// absorbs them and still answers. Only configuration gaps, auth failures,
/// malformed command/vision requests, and the genuinely unexpected surface
/// as errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("OpenAI API key is not configured")]
    MissingOpenAiKey,

    #[error("missing or incorrect shared secret")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingOpenAiKey => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::MissingOpenAiKey => "OPENAI_API_KEY_NOT_FOUND",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            ApiError::MissingOpenAiKey | ApiError::Unauthorized => None,
            ApiError::BadRequest(msg) | ApiError::Internal(msg) => Some(msg.clone()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.error_code(),
            detail: self.detail(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Convert Axum body rejections into structural 400s on the endpoints that
/// want them (the ask endpoint treats a bad body as an empty question
/// instead).
impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
