//! Arena Types - Core types for contest-environment fleet keeping
//!
//! Arena keeps a fleet of contest-problem VMs ("problem environments")
//! warm and correctly distributed across cloud projects and zones. This
//! crate carries the data model shared by the scheduler core, the service
//! clients, and the CLI.
//!
//! ## Key Concepts
//!
//! - **ProblemEnvironment**: an observed VM record served by the scoring
//!   service; read-only snapshot input to a reconcile cycle
//! - **Problem**: one contest problem's instance pool, with per-lifecycle
//!   counters and pool policy; rebuilt from scratch every cycle
//! - **ZonePriority**: a (project, zone) placement target with capacity
//!   and priority
//! - **CreationTarget / DeletionTarget**: ephemeral plan items consumed
//!   within the cycle that produced them
//! - **ArenaConfig**: the operator-provided policy and service endpoints

#![deny(unsafe_code)]

pub mod config;
pub mod environment;
pub mod pool;

// Re-export main types
pub use config::{
    ArenaConfig, ConfigError, FleetConfig, PacingConfig, ProblemConfig, ProjectConfig,
    SchedulerConfig, ScoreserverConfig, ZoneConfig,
};
pub use environment::{InnerStatus, Instance, ProblemEnvironment};
pub use pool::{
    CreationTarget, DeletionTarget, KeptInstance, Problem, SchedulerDump, ZonePriority,
};
