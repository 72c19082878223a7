//! Errors surfaced by the tutor service.

use thiserror::Error;

use crate::llm::CompletionError;

/// Message shown to callers for every upstream failure. The real cause is
/// only ever logged.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to get AI response. Please try again.";

#[derive(Debug, Error)]
pub enum TutorError {
    /// The caller has no identity.
    #[error("Must be logged in to ask questions")]
    Unauthorized,

    /// The question (or its topic/difficulty) failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The completion endpoint failed or returned nothing usable.
    #[error("Failed to get AI response. Please try again.")]
    Upstream(#[source] CompletionError),

    /// Propagated from the SQLite store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
