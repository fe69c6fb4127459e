//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use skipwise_core::Error as CoreError;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self {
    match e {
      CoreError::SubjectNotFound(id) => {
        Self::NotFound(format!("subject {id} not found"))
      }
      CoreError::EmptyName
      | CoreError::ZeroSemesterClasses
      | CoreError::CounterOverflow
      | CoreError::BatchTooLarge { .. } => Self::BadRequest(e.to_string()),
      CoreError::InvariantViolation { .. } | CoreError::Storage(_) => {
        Self::Internal(e.to_string())
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
