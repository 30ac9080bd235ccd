//! Scheduler error types

use arena_fleet::FleetError;
use arena_scoreserver::ScoreserverError;
use thiserror::Error;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Hard failures that abort a reconcile cycle. Soft conditions (unknown
/// pools, failed deletions) are logged and absorbed where they occur
/// instead of surfacing here.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The observed-state read failed; there is nothing to reconcile against
    #[error("failed to observe environment state: {0}")]
    Observation(#[from] ScoreserverError),

    /// A create call failed; `pending` names every problem still waiting,
    /// the failed one included
    #[error("instance creation failed, {} problem(s) left pending [{}]: {source}", pending.len(), pending.join(", "))]
    Creation {
        source: FleetError,
        pending: Vec<String>,
    },

    /// Every zone hit its capacity ceiling before the creation queue drained
    #[error("zone capacity exhausted, {} problem(s) left pending [{}]", pending.len(), pending.join(", "))]
    CapacityExhausted { pending: Vec<String> },
}
