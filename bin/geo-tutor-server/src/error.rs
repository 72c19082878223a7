//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are converted to a JSON
//! `{"error": "..."}` body with an appropriate status code.
//!
//! Upstream and database failures are logged with full detail; the caller
//! only ever sees a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use geo_tutor_core::TutorError;
use geo_tutor_core::error::UPSTREAM_FAILURE_MESSAGE;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The request carried no usable caller identity.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request body exceeded the accepted size.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// The completion endpoint failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Propagated from the SQLite store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<TutorError> for ServerError {
    fn from(e: TutorError) -> Self {
        match e {
            TutorError::Unauthorized => ServerError::Unauthorized(TutorError::Unauthorized.to_string()),
            TutorError::InvalidInput(m) => ServerError::BadRequest(m),
            // The cause was already logged by the tutor.
            TutorError::Upstream(cause) => ServerError::Upstream(cause.to_string()),
            TutorError::Database(db) => ServerError::Database(db),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::PayloadTooLarge(m) => (StatusCode::PAYLOAD_TOO_LARGE, m.clone()),
            ServerError::Upstream(_) => (StatusCode::BAD_GATEWAY, UPSTREAM_FAILURE_MESSAGE.to_owned()),
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}
