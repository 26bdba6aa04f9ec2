//! HTTP error responses: `{"error": {"code": ..., "message": ...}}`.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mentora_core::error::MentoraError;
use serde::Serialize;
use tracing::error;

#[derive(Debug)]
pub struct ApiError(pub MentoraError);

impl From<MentoraError> for ApiError {
    fn from(err: MentoraError) -> Self {
        Self(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self(MentoraError::Validation {
            message: message.into(),
        })
    }

    pub fn status(&self) -> StatusCode {
        match self.0 {
            MentoraError::NotFound { .. } => StatusCode::NOT_FOUND,
            MentoraError::AlreadyExists { .. }
            | MentoraError::InvalidState { .. }
            | MentoraError::CapacityExceeded { .. } => StatusCode::CONFLICT,
            MentoraError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            MentoraError::Database(_) | MentoraError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.0.code(),
                message: self.0.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
