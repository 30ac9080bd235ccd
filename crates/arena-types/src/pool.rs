//! Pool bookkeeping built from one observation pass
//!
//! A [`Problem`] is the per-image registry entry the scheduler converges:
//! configured policy plus counters tallied from the snapshot. None of it
//! survives a cycle; the next observation rebuilds everything from zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{ProblemConfig, ZoneConfig};
use crate::environment::InnerStatus;

/// One problem pool: configured policy plus counters from the last
/// observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// Contest problem code
    pub name: String,

    /// Problem id on the scoring service
    pub problem_id: String,

    /// Machine image the pool is built from; the registry key
    pub machine_image_name: String,

    /// Target steady-state pool size
    pub keep_pool: u32,

    /// Floor the pool must never be shrunk below
    pub default_instance: u32,

    /// Instances still booting or failing their readiness check
    pub not_ready: u32,

    /// Instances ready for hand-out (includes unclassified ones)
    pub ready: u32,

    /// Instances currently assigned to a team
    pub under_challenge: u32,

    /// Instances being scored
    pub under_scoring: u32,

    /// Instances a team has returned; terminal until deleted
    pub abandoned: u32,

    /// Every observed instance of this pool, any status
    pub current_instance: u32,

    /// Deletion candidates observed this cycle, in scan order
    pub kept_instances: Vec<KeptInstance>,
}

impl Problem {
    /// Fresh registry entry with all counters zeroed.
    pub fn from_config(config: &ProblemConfig) -> Self {
        Self {
            name: config.name.clone(),
            problem_id: config.problem_id.clone(),
            machine_image_name: config.machine_image_name.clone(),
            keep_pool: config.keep_pool,
            default_instance: config.default_instance,
            not_ready: 0,
            ready: 0,
            under_challenge: 0,
            under_scoring: 0,
            abandoned: 0,
            current_instance: 0,
            kept_instances: Vec::new(),
        }
    }

    /// Bump the counters for one observed instance.
    pub fn record(&mut self, status: InnerStatus) {
        match status {
            InnerStatus::NotReady => self.not_ready += 1,
            InnerStatus::Ready | InnerStatus::Unclassified => self.ready += 1,
            InnerStatus::UnderChallenge => self.under_challenge += 1,
            InnerStatus::UnderScoring => self.under_scoring += 1,
            InnerStatus::Abandoned => self.abandoned += 1,
        }
        self.current_instance += 1;
    }

    /// Pool size the keeper steers toward `keep_pool`: instances that are
    /// (or will become) hand-out ready. Assigned, scoring and abandoned
    /// instances no longer count.
    pub fn pooled(&self) -> u32 {
        self.ready + self.not_ready
    }

    /// Instances missing from the pool.
    pub fn deficit(&self) -> u32 {
        self.keep_pool.saturating_sub(self.pooled())
    }

    /// Instances beyond the target pool size.
    pub fn surplus(&self) -> u32 {
        self.pooled().saturating_sub(self.keep_pool)
    }
}

/// A deletion candidate remembered during aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeptInstance {
    /// Environment name on the scoring service; the fleet delete key
    pub instance_name: String,

    /// Cloud project the instance runs in
    pub project: String,

    /// Zone the instance runs in
    pub zone: String,

    /// Status at observation time
    pub status: InnerStatus,

    /// Creation timestamp; newer instances are discarded first
    pub created_at: DateTime<Utc>,
}

/// Per-zone occupancy against the configured ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonePriority {
    /// Cloud project name
    pub project: String,

    /// Zone name
    pub zone: String,

    /// Placement preference; lower is preferred
    pub priority: u32,

    /// Capacity ceiling
    pub max_instance: u32,

    /// Instances observed in the zone, plus those placed this cycle
    pub current_instance: u32,
}

impl ZonePriority {
    /// Zone with zero observed occupancy.
    pub fn from_config(project: &str, zone: &ZoneConfig) -> Self {
        Self {
            project: project.to_owned(),
            zone: zone.name.clone(),
            priority: zone.priority,
            max_instance: zone.max_instance,
            current_instance: 0,
        }
    }

    /// Remaining capacity.
    pub fn available(&self) -> u32 {
        self.max_instance.saturating_sub(self.current_instance)
    }

    /// Account for one placement into this zone.
    pub fn occupy(&mut self) {
        self.current_instance += 1;
    }
}

/// One instance the planner wants brought up. Placement is decided later,
/// at execution time, against live zone occupancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreationTarget {
    /// Contest problem code, for logs
    pub problem_name: String,

    /// Problem id forwarded to the fleet service
    pub problem_id: String,

    /// Machine image to boot from
    pub machine_image_name: String,
}

/// One instance the planner wants torn down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionTarget {
    /// Contest problem code, for logs
    pub problem_name: String,

    /// Environment name; the fleet delete key
    pub instance_name: String,

    /// Cloud project the instance runs in
    pub project: String,

    /// Zone the instance runs in
    pub zone: String,
}

/// Snapshot of one aggregate-and-plan pass, before any execution.
/// Serialized by the dump command for operator inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerDump {
    /// Registry keyed by machine image name
    pub problems: BTreeMap<String, Problem>,

    /// Zone occupancy as observed
    pub zones: Vec<ZonePriority>,

    /// Creations the executor would attempt
    pub pending_creations: Vec<CreationTarget>,

    /// Deletions the executor would attempt
    pub pending_deletions: Vec<DeletionTarget>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProblemConfig;

    fn sample_problem() -> Problem {
        Problem::from_config(&ProblemConfig {
            name: "110".into(),
            problem_id: "p-110".into(),
            machine_image_name: "image-110".into(),
            keep_pool: 3,
            default_instance: 1,
        })
    }

    #[test]
    fn record_tallies_each_status() {
        let mut problem = sample_problem();
        problem.record(InnerStatus::NotReady);
        problem.record(InnerStatus::Ready);
        problem.record(InnerStatus::Unclassified);
        problem.record(InnerStatus::UnderChallenge);
        problem.record(InnerStatus::UnderScoring);
        problem.record(InnerStatus::Abandoned);

        assert_eq!(problem.not_ready, 1);
        assert_eq!(problem.ready, 2);
        assert_eq!(problem.under_challenge, 1);
        assert_eq!(problem.under_scoring, 1);
        assert_eq!(problem.abandoned, 1);
        assert_eq!(problem.current_instance, 6);
    }

    #[test]
    fn pooled_ignores_assigned_and_abandoned() {
        let mut problem = sample_problem();
        problem.ready = 2;
        problem.not_ready = 1;
        problem.under_challenge = 4;
        problem.abandoned = 7;

        assert_eq!(problem.pooled(), 3);
        assert_eq!(problem.deficit(), 0);
        assert_eq!(problem.surplus(), 0);
    }

    #[test]
    fn deficit_and_surplus_saturate() {
        let mut problem = sample_problem();
        problem.ready = 1;
        assert_eq!(problem.deficit(), 2);
        assert_eq!(problem.surplus(), 0);

        problem.ready = 5;
        assert_eq!(problem.deficit(), 0);
        assert_eq!(problem.surplus(), 2);
    }

    #[test]
    fn zone_capacity_saturates() {
        let mut zone = ZonePriority::from_config(
            "contest-prod",
            &ZoneConfig {
                name: "asia-northeast1-a".into(),
                max_instance: 2,
                priority: 1,
            },
        );
        assert_eq!(zone.available(), 2);

        zone.occupy();
        zone.occupy();
        assert_eq!(zone.available(), 0);

        zone.current_instance = 5;
        assert_eq!(zone.available(), 0);
    }
}
