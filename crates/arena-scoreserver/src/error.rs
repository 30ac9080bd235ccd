//! Scoring service error types

use thiserror::Error;

/// Result type for scoring service operations
pub type ScoreserverResult<T> = Result<T, ScoreserverError>;

/// Errors returned by the scoring service client. A malformed record in
/// the response body (including an unknown inner status) surfaces through
/// the `Http` variant as a decode failure.
#[derive(Debug, Error)]
pub enum ScoreserverError {
    /// Transport failure or undecodable response body
    #[error("scoring service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the scoring service
    #[error("scoring service returned status {status}: {message}")]
    Api { status: u16, message: String },
}
