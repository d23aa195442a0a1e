use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use funcworker_protocol::{DecodeError, EncodeError, ResolveError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-call failures surfaced back to the host.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Decode(_) | ApiError::Resolve(_) => StatusCode::BAD_REQUEST,
            ApiError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Decode(_) => "decode_error",
            ApiError::Resolve(ResolveError::BindingNotFound(_)) => "binding_not_found",
            ApiError::Resolve(ResolveError::ShapeMismatch { .. }) => "shape_mismatch",
            ApiError::Resolve(ResolveError::InvalidValue { .. }) => "invalid_value",
            ApiError::Encode(_) => "encode_error",
        }
    }
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            code: self.code().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_is_bad_request() {
        let err = ApiError::from(ResolveError::InvalidValue {
            binding: "res.statusCode".to_string(),
            reason: "\"teapot\" is not an HTTP status code".to_string(),
        });

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "invalid_value");
        assert!(err.to_string().contains("res.statusCode"));
    }
}
