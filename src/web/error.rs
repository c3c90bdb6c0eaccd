//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::NutrisenseError;

/// Failure while handling a request.
///
/// Form input never produces one of these; they only come from a context that
/// disagrees with itself (for example a feature-width mismatch).
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("Prediction failed: {0}")]
    Prediction(#[from] NutrisenseError),

    #[error("Form options unavailable: {0}")]
    Options(#[from] crate::domain::EncodeError),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        tracing::error!("{self}");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
