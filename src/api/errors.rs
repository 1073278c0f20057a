use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::backend::{BackendError, ErrorKind};

// ============================================================================
// API Errors - rendered as `{"message": ...}`
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Backend(e) => e.kind(),
            ApiError::Unauthorized(_) => ErrorKind::Unauthorized,
            ApiError::Validation(_) => ErrorKind::Validation,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self.kind() {
            ErrorKind::Internal => {
                tracing::error!(error = %self, "Responding with internal error");
                "Internal server error".to_string()
            }
            kind => {
                tracing::debug!(error = %self, kind = kind.as_str(), "Responding with error");
                self.to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
