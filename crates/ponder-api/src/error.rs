//! API error type and its [`IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error surfaced by an API handler.
///
/// Client-class domain signals become `400 Bad Request` and carry their own
/// message in the body; everything else is logged and collapsed into a
/// detail-free `500`.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] ponder_core::Error);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = if self.0.is_client_error() {
      (StatusCode::BAD_REQUEST, self.0.to_string())
    } else {
      tracing::error!(error = %self.0, "request failed");
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        "something went wrong".to_owned(),
      )
    };

    (status, Json(json!({ "error": message }))).into_response()
  }
}
