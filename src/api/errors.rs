//! Status API errors
//!
//! Every failure answers with a flat JSON body carrying the request id, so a
//! dashboard can match it against the trace log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body returned for every non-2xx answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    /// BAD_REQUEST or INTERNAL_ERROR
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("[{request_id}] rejected query: {message}")]
    BadRequest { request_id: String, message: String },

    #[error("[{request_id}] ledger unavailable: {message}")]
    Internal { request_id: String, message: String },
}

impl ApiError {
    pub fn bad_request(request_id: String, message: String) -> Self {
        Self::BadRequest { request_id, message }
    }

    pub fn internal_error(request_id: String, message: String) -> Self {
        Self::Internal { request_id, message }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn to_body(&self) -> ErrorResponse {
        let (request_id, message) = match self {
            Self::BadRequest { request_id, message } | Self::Internal { request_id, message } => {
                (request_id, message)
            }
        };
        ErrorResponse {
            request_id: request_id.clone(),
            code: self.code().to_string(),
            message: message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal { request_id, message } = &self {
            tracing::error!(%request_id, "Status API failure: {}", message);
        }
        (self.status(), Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let response = ApiError::bad_request("r1".into(), "limit too large".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::internal_error("r2".into(), "disk".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_display_includes_request_id() {
        let err = ApiError::bad_request("abc".into(), "nope".into());
        assert_eq!(err.to_string(), "[abc] rejected query: nope");

        let err = ApiError::internal_error("def".into(), "disk".into());
        assert_eq!(err.to_string(), "[def] ledger unavailable: disk");
    }

    #[test]
    fn test_body_is_flat() {
        let body = ApiError::internal_error("r3".into(), "disk".into()).to_body();
        assert_eq!(
            body,
            ErrorResponse {
                request_id: "r3".into(),
                code: "INTERNAL_ERROR".into(),
                message: "disk".into(),
            }
        );

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json.as_object().map(|o| o.len()), Some(3));
    }
}
