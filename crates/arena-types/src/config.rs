//! Operator configuration: service endpoints and pool policy
//!
//! The configuration is the sole input besides the observed snapshot; a
//! reconcile cycle is a pure function of the two. Counts are unsigned so
//! the `keep_pool >= 0` / `default_instance >= 0` policy constraints hold
//! by construction.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Top-level configuration for the arena fleet keeper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Scoring service (observed-state source)
    pub scoreserver: ScoreserverConfig,

    /// Fleet-lifecycle service (create/delete sink)
    pub fleet: FleetConfig,

    /// Reconcile scheduling and pacing
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Placement targets, grouped by cloud project
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,

    /// Problem pools to keep warm
    #[serde(default)]
    pub problems: Vec<ProblemConfig>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            scoreserver: ScoreserverConfig::default(),
            fleet: FleetConfig::default(),
            scheduler: SchedulerConfig::default(),
            projects: Vec::new(),
            problems: Vec::new(),
        }
    }
}

/// Scoring service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreserverConfig {
    /// Base URL, e.g. `http://127.0.0.1:8905`
    #[serde(default = "default_scoreserver_endpoint")]
    pub endpoint: String,
}

impl Default for ScoreserverConfig {
    fn default() -> Self {
        Self {
            endpoint: default_scoreserver_endpoint(),
        }
    }
}

/// Fleet-lifecycle service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Base URL, e.g. `http://127.0.0.1:8950`
    #[serde(default = "default_fleet_endpoint")]
    pub endpoint: String,

    /// Bearer credential forwarded on every call; empty disables the header
    #[serde(default)]
    pub credential: String,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            endpoint: default_fleet_endpoint(),
            credential: String::new(),
        }
    }
}

/// Reconcile loop and pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Interval between cycles in loop mode, seconds
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Inter-call delays toward the fleet service
    #[serde(default)]
    pub pacing: PacingConfig,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            pacing: PacingConfig::default(),
        }
    }
}

/// Fixed delays applied before every fleet-lifecycle call. The fleet
/// service tolerates only slow successive connections; these are
/// deliberate backpressure, not retry backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Delay before each create call, seconds (fractional allowed)
    #[serde(default = "default_pacing_secs")]
    pub create_delay_secs: f64,

    /// Delay before each delete call, seconds (fractional allowed)
    #[serde(default = "default_pacing_secs")]
    pub delete_delay_secs: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            create_delay_secs: default_pacing_secs(),
            delete_delay_secs: default_pacing_secs(),
        }
    }
}

impl PacingConfig {
    /// Delay before each create call.
    pub fn create_delay(&self) -> Duration {
        Duration::from_secs_f64(self.create_delay_secs)
    }

    /// Delay before each delete call.
    pub fn delete_delay(&self) -> Duration {
        Duration::from_secs_f64(self.delete_delay_secs)
    }
}

/// One cloud project and its placement zones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Cloud project name
    pub name: String,

    /// Zones instances may be placed in
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
}

/// One placement zone within a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Zone name, e.g. `asia-northeast1-a`
    pub name: String,

    /// Capacity ceiling for this zone
    pub max_instance: u32,

    /// Placement preference; lower is preferred
    pub priority: u32,
}

/// Pool policy for one contest problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemConfig {
    /// Human-facing problem name (the contest problem code)
    pub name: String,

    /// Problem id on the scoring service; authoritative over observed values
    pub problem_id: String,

    /// Machine image instances are created from; the pool registry key
    pub machine_image_name: String,

    /// Target steady-state count of Ready+NotReady instances
    pub keep_pool: u32,

    /// Floor below which the pool must never be shrunk
    pub default_instance: u32,
}

/// Configuration validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required identity field is empty
    #[error("problem entry {index}: {field} must not be empty")]
    EmptyProblemField { index: usize, field: &'static str },

    /// Two problems share a machine image name (the registry key)
    #[error("duplicate machine image name in problems: {0}")]
    DuplicateMachineImage(String),

    /// Two problems share a problem id
    #[error("duplicate problem id in problems: {0}")]
    DuplicateProblemId(String),

    /// A project or zone name is empty
    #[error("project entry {index}: {field} must not be empty")]
    EmptyProjectField { index: usize, field: &'static str },

    /// Two zone entries point at the same (project, zone)
    #[error("duplicate placement zone: {project}/{zone}")]
    DuplicateZone { project: String, zone: String },

    /// A pacing delay is negative or not finite
    #[error("pacing delay {field} must be a finite, non-negative number of seconds")]
    InvalidPacing { field: &'static str },
}

impl ArenaConfig {
    /// Validate cross-field constraints the serde layer cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, problem) in self.problems.iter().enumerate() {
            for (field, value) in [
                ("name", &problem.name),
                ("problem_id", &problem.problem_id),
                ("machine_image_name", &problem.machine_image_name),
            ] {
                if value.is_empty() {
                    return Err(ConfigError::EmptyProblemField { index, field });
                }
            }
        }

        let mut images = HashSet::new();
        let mut problem_ids = HashSet::new();
        for problem in &self.problems {
            if !images.insert(problem.machine_image_name.as_str()) {
                return Err(ConfigError::DuplicateMachineImage(
                    problem.machine_image_name.clone(),
                ));
            }
            if !problem_ids.insert(problem.problem_id.as_str()) {
                return Err(ConfigError::DuplicateProblemId(problem.problem_id.clone()));
            }
        }

        let mut zones = HashSet::new();
        for (index, project) in self.projects.iter().enumerate() {
            if project.name.is_empty() {
                return Err(ConfigError::EmptyProjectField {
                    index,
                    field: "name",
                });
            }
            for zone in &project.zones {
                if zone.name.is_empty() {
                    return Err(ConfigError::EmptyProjectField {
                        index,
                        field: "zones.name",
                    });
                }
                if !zones.insert((project.name.as_str(), zone.name.as_str())) {
                    return Err(ConfigError::DuplicateZone {
                        project: project.name.clone(),
                        zone: zone.name.clone(),
                    });
                }
            }
        }

        let pacing = &self.scheduler.pacing;
        if !pacing.create_delay_secs.is_finite() || pacing.create_delay_secs < 0.0 {
            return Err(ConfigError::InvalidPacing {
                field: "create_delay_secs",
            });
        }
        if !pacing.delete_delay_secs.is_finite() || pacing.delete_delay_secs < 0.0 {
            return Err(ConfigError::InvalidPacing {
                field: "delete_delay_secs",
            });
        }

        Ok(())
    }
}

fn default_interval_secs() -> u64 {
    30
}

fn default_pacing_secs() -> f64 {
    1.0
}

fn default_scoreserver_endpoint() -> String {
    "http://127.0.0.1:8905".to_string()
}

fn default_fleet_endpoint() -> String {
    "http://127.0.0.1:8950".to_string()
}
