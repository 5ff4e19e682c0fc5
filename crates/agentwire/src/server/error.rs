use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{CoreError, DispatchError};

/// Machine-readable error code; each one has a fixed HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    NotFound,
    ModelError,
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ModelError => StatusCode::BAD_GATEWAY,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// `{ "ok": false, "error": { "code": "<code>", "message": "<message>" } }`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    pub ok: bool,
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError(ApiErrorResponse);

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self(ApiErrorResponse {
            ok: false,
            error: ApiErrorBody {
                code,
                message: message.into(),
            },
        })
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn code(&self) -> ErrorCode {
        self.0.error.code
    }

    pub fn status(&self) -> StatusCode {
        self.code().status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.0)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InvalidInput(_) | CoreError::Dispatch(DispatchError::MalformedInput(_)) => {
                ErrorCode::BadRequest
            }
            CoreError::Unauthorized(_) => ErrorCode::Unauthorized,
            CoreError::Model(_) => ErrorCode::ModelError,
            CoreError::Dispatch(_) | CoreError::Config(_) | CoreError::Internal(_) => {
                tracing::error!(error = %err, "request failed");
                ErrorCode::Internal
            }
        };
        let message = match err {
            CoreError::InvalidInput(msg)
            | CoreError::Unauthorized(msg)
            | CoreError::Model(msg)
            | CoreError::Internal(msg) => msg,
            other => other.to_string(),
        };
        Self::new(code, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_status_codes() {
        let cases = [
            (CoreError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (CoreError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (
                CoreError::Dispatch(DispatchError::MalformedInput("too long".into())),
                StatusCode::BAD_REQUEST,
            ),
            (CoreError::Model("down".into()), StatusCode::BAD_GATEWAY),
            (
                CoreError::Dispatch(DispatchError::DuplicateCommand("a".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn codes_serialize_in_snake_case() {
        let value = serde_json::to_value(ApiError::new(ErrorCode::ModelError, "down").0).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"]["code"], "model_error");
        assert_eq!(value["error"]["message"], "down");
    }
}
