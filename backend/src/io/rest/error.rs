use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{error, warn};

use crate::domain::CoreError;
use shared::ErrorResponse;

impl CoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CoreError::IdentityMismatch => StatusCode::FORBIDDEN,
            CoreError::AlreadyMarked => StatusCode::CONFLICT,
            CoreError::InsufficientBalance { .. } => StatusCode::CONFLICT,
            CoreError::Unauthorized => StatusCode::UNAUTHORIZED,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CoreError::InvalidState(_) => StatusCode::CONFLICT,
            CoreError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Storage details stay in the logs
        let message = match &self {
            CoreError::StorageFailure(e) => {
                error!("Storage failure: {:#}", e);
                "Storage failure".to_string()
            }
            other => {
                warn!("Request rejected: {}", other);
                other.to_string()
            }
        };

        let body = ErrorResponse {
            error: message,
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
