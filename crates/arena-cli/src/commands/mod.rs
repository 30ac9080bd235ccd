//! CLI command implementations

pub mod contest;
pub mod env;
pub mod fleet;
pub mod scheduler;
