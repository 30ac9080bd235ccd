//! Fleet-lifecycle service client
//!
//! The write side of the reconcile loop: creating instances from machine
//! images and tearing them down. The service is slow to act and intolerant
//! of rapid successive connections, so callers pace their calls; this
//! crate only speaks the wire protocol.

#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod lifecycle;

pub use client::FleetClient;
pub use error::{FleetError, FleetResult};
pub use lifecycle::FleetLifecycle;
