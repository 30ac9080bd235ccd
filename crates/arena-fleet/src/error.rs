//! Fleet-lifecycle error types

use thiserror::Error;

/// Result type for fleet-lifecycle operations
pub type FleetResult<T> = Result<T, FleetError>;

/// Errors returned by the fleet-lifecycle client.
#[derive(Debug, Error)]
pub enum FleetError {
    /// Transport failure or undecodable response body
    #[error("fleet service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the fleet service
    #[error("fleet service returned status {status}: {message}")]
    Api { status: u16, message: String },
}
