//! Scoring service client
//!
//! The scoring service owns the environment records; this crate provides
//! the read-only view the scheduler aggregates from. All state lives on
//! the remote side - a failed read here aborts the reconcile cycle rather
//! than falling back to anything stale.

#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod source;

pub use client::ScoreserverClient;
pub use error::{ScoreserverError, ScoreserverResult};
pub use source::EnvironmentSource;
