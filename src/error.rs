// Request-level errors and their HTTP mapping

use crate::schema::{FieldError, ValidationError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Selector missing or outside the fixed set
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Raw fixture data did not conform on a validating route
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Selector accepted but nothing backs it, or encoding failed
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body: `{"detail": "..."}` or `{"detail": [field errors]}`
#[derive(Serialize)]
#[serde(untagged)]
enum ErrorBody<'a> {
    Message { detail: String },
    Fields { detail: &'a [FieldError] },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Validation(err) => {
                log::warn!("response validation failed: {}", err);
                (status, Json(ErrorBody::Fields { detail: &err.errors })).into_response()
            }
            ApiError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                (status, Json(ErrorBody::Message { detail: msg.clone() })).into_response()
            }
            ApiError::BadRequest(msg) => {
                (status, Json(ErrorBody::Message { detail: msg.clone() })).into_response()
            }
        }
    }
}
