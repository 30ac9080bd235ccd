//! Reconciliation engine for contest-problem VM pools
//!
//! One cycle: observe the scoring service's environment list, tally
//! per-problem and per-zone counters, plan creations and deletions against
//! pool policy, then apply the plan through the fleet service. Deletions
//! are applied tolerantly (a failure postpones the rest to the next
//! cycle), creations fail fast with the unplaced problems named. Cycles
//! share no state; every run rebuilds its world from the live snapshot.

#![deny(unsafe_code)]

pub mod aggregate;
pub mod error;
pub mod execute;
pub mod plan;
pub mod reconciler;

pub use aggregate::AggregateState;
pub use error::{SchedulerError, SchedulerResult};
pub use plan::ReconcilePlan;
pub use reconciler::Reconciler;
