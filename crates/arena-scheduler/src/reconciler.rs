//! Reconcile orchestration: one guarded aggregate-plan-execute pass

use crate::aggregate;
use crate::error::SchedulerResult;
use crate::execute;
use crate::plan;
use arena_fleet::FleetLifecycle;
use arena_scoreserver::EnvironmentSource;
use arena_types::{ArenaConfig, SchedulerDump};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Drives reconcile cycles against a snapshot source and a fleet sink.
///
/// At most one cycle runs at a time: the cycle guard is held across the
/// whole observe-plan-execute sequence and released on every exit path,
/// so a trigger landing mid-cycle waits its turn instead of interleaving.
pub struct Reconciler {
    config: ArenaConfig,
    source: Arc<dyn EnvironmentSource>,
    fleet: Arc<dyn FleetLifecycle>,
    cycle_guard: Mutex<()>,
}

impl Reconciler {
    /// Create a reconciler over the given source and sink.
    pub fn new(
        config: ArenaConfig,
        source: Arc<dyn EnvironmentSource>,
        fleet: Arc<dyn FleetLifecycle>,
    ) -> Self {
        Self {
            config,
            source,
            fleet,
            cycle_guard: Mutex::new(()),
        }
    }

    /// Run one full cycle: observe, aggregate, plan, delete abandoned,
    /// delete surplus, create deficit. Returns the first hard error;
    /// deletion failures are absorbed and retried naturally next cycle.
    pub async fn reconcile(&self) -> SchedulerResult<()> {
        let _cycle = self.cycle_guard.lock().await;

        tracing::info!("Reconcile cycle starting");

        let environments = self.source.list_environments().await?;
        let mut state = aggregate::aggregate(&self.config, &environments);
        aggregate::log_snapshot(&state);

        let plan = plan::plan(&state.problems);
        tracing::info!(
            abandoned = state.abandoned.len(),
            deletions = plan.deletions.len(),
            creations = plan.creations.len(),
            "Reconcile plan computed"
        );

        let pacing = &self.config.scheduler.pacing;
        let abandoned_deleted =
            execute::run_deletions(self.fleet.as_ref(), &state.abandoned, pacing.delete_delay())
                .await;
        let surplus_deleted =
            execute::run_deletions(self.fleet.as_ref(), &plan.deletions, pacing.delete_delay())
                .await;
        execute::run_creations(
            self.fleet.as_ref(),
            &plan.creations,
            &mut state.zones,
            pacing.create_delay(),
        )
        .await?;

        tracing::info!(
            abandoned_deleted,
            surplus_deleted,
            created = plan.creations.len(),
            "Reconcile cycle complete"
        );

        Ok(())
    }

    /// Observe, aggregate and plan, but execute nothing. The returned
    /// dump lists deletions in execution order, abandoned instances
    /// first.
    pub async fn dump(&self) -> SchedulerResult<SchedulerDump> {
        let _cycle = self.cycle_guard.lock().await;

        let environments = self.source.list_environments().await?;
        let state = aggregate::aggregate(&self.config, &environments);
        let plan = plan::plan(&state.problems);

        let mut pending_deletions = state.abandoned;
        pending_deletions.extend(plan.deletions);

        Ok(SchedulerDump {
            problems: state.problems,
            zones: state.zones,
            pending_creations: plan.creations,
            pending_deletions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchedulerError;
    use arena_fleet::FleetResult;
    use arena_scoreserver::{ScoreserverError, ScoreserverResult};
    use arena_types::{
        FleetConfig, InnerStatus, Instance, ProblemConfig, ProblemEnvironment, ProjectConfig,
        SchedulerConfig, ScoreserverConfig, ZoneConfig,
    };
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::Mutex as StdMutex;

    type EventLog = Arc<StdMutex<Vec<String>>>;

    struct FakeSource {
        environments: Vec<ProblemEnvironment>,
        log: EventLog,
        fail: bool,
    }

    #[async_trait]
    impl EnvironmentSource for FakeSource {
        async fn list_environments(&self) -> ScoreserverResult<Vec<ProblemEnvironment>> {
            self.log.lock().unwrap().push("observe".into());
            tokio::task::yield_now().await;

            if self.fail {
                return Err(ScoreserverError::Api {
                    status: 502,
                    message: "scoring service down".into(),
                });
            }
            Ok(self.environments.clone())
        }

        async fn get_environment(&self, name: &str) -> ScoreserverResult<ProblemEnvironment> {
            Err(ScoreserverError::Api {
                status: 404,
                message: name.to_string(),
            })
        }
    }

    struct LogFleet {
        log: EventLog,
    }

    #[async_trait]
    impl FleetLifecycle for LogFleet {
        async fn create_instance(
            &self,
            _problem_id: &str,
            machine_image_name: &str,
            _project: &str,
            _zone: &str,
        ) -> FleetResult<Vec<Instance>> {
            self.log
                .lock()
                .unwrap()
                .push(format!("create {}", machine_image_name));
            tokio::task::yield_now().await;
            Ok(Vec::new())
        }

        async fn delete_instance(
            &self,
            instance_name: &str,
            _project: &str,
            _zone: &str,
        ) -> FleetResult<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("delete {}", instance_name));
            tokio::task::yield_now().await;
            Ok(())
        }
    }

    fn config(problems: Vec<ProblemConfig>) -> ArenaConfig {
        let mut config = ArenaConfig {
            scoreserver: ScoreserverConfig {
                endpoint: "http://127.0.0.1:8905".into(),
            },
            fleet: FleetConfig {
                endpoint: "http://127.0.0.1:8950".into(),
                credential: String::new(),
            },
            scheduler: SchedulerConfig::default(),
            projects: vec![ProjectConfig {
                name: "contest-prod".into(),
                zones: vec![ZoneConfig {
                    name: "zone-a".into(),
                    max_instance: 20,
                    priority: 1,
                }],
            }],
            problems,
        };
        config.scheduler.pacing.create_delay_secs = 0.0;
        config.scheduler.pacing.delete_delay_secs = 0.0;
        config
    }

    fn problem(name: &str, keep_pool: u32, default_instance: u32) -> ProblemConfig {
        ProblemConfig {
            name: name.into(),
            problem_id: format!("p-{}", name),
            machine_image_name: format!("image-{}", name),
            keep_pool,
            default_instance,
        }
    }

    fn env(name: &str, image: &str, status: InnerStatus, age_minutes: i64) -> ProblemEnvironment {
        ProblemEnvironment {
            id: uuid::Uuid::new_v4(),
            name: name.into(),
            inner_status: status,
            status: None,
            problem_id: format!("p-{}", image.trim_start_matches("image-")),
            machine_image_name: Some(image.into()),
            project: "contest-prod".into(),
            zone: "zone-a".into(),
            host: "203.0.113.10".into(),
            user: "contest-user".into(),
            password: "secret".into(),
            service: "SSH".into(),
            port: 22,
            created_at: Utc::now() - Duration::minutes(age_minutes),
            updated_at: Utc::now(),
        }
    }

    fn reconciler(
        problems: Vec<ProblemConfig>,
        environments: Vec<ProblemEnvironment>,
        log: &EventLog,
        fail_observe: bool,
    ) -> Reconciler {
        Reconciler::new(
            config(problems),
            Arc::new(FakeSource {
                environments,
                log: log.clone(),
                fail: fail_observe,
            }),
            Arc::new(LogFleet { log: log.clone() }),
        )
    }

    #[tokio::test]
    async fn cycle_runs_phases_in_order() {
        let log: EventLog = Arc::default();
        // image-110 has one abandoned and one surplus instance,
        // image-205 is one short
        let reconciler = reconciler(
            vec![problem("110", 1, 0), problem("205", 1, 0)],
            vec![
                env("i-old", "image-110", InnerStatus::Ready, 90),
                env("i-new", "image-110", InnerStatus::Ready, 5),
                env("i-ab", "image-110", InnerStatus::Abandoned, 30),
            ],
            &log,
            false,
        );

        reconciler.reconcile().await.unwrap();

        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec!["observe", "delete i-ab", "delete i-new", "create image-205"]
        );
    }

    #[tokio::test]
    async fn dump_executes_nothing() {
        let log: EventLog = Arc::default();
        let reconciler = reconciler(
            vec![problem("110", 1, 0), problem("205", 1, 0)],
            vec![
                env("i-old", "image-110", InnerStatus::Ready, 90),
                env("i-new", "image-110", InnerStatus::Ready, 5),
                env("i-ab", "image-110", InnerStatus::Abandoned, 30),
            ],
            &log,
            false,
        );

        let dump = reconciler.dump().await.unwrap();

        assert_eq!(log.lock().unwrap().clone(), vec!["observe"]);
        assert_eq!(dump.problems["image-110"].ready, 2);
        assert_eq!(dump.problems["image-110"].abandoned, 1);
        assert_eq!(dump.pending_creations.len(), 1);
        // abandoned first, then planned surplus
        let pending: Vec<&str> = dump
            .pending_deletions
            .iter()
            .map(|d| d.instance_name.as_str())
            .collect();
        assert_eq!(pending, vec!["i-ab", "i-new"]);
    }

    #[tokio::test]
    async fn observation_failure_aborts_before_any_fleet_call() {
        let log: EventLog = Arc::default();
        let reconciler = reconciler(vec![problem("110", 2, 0)], Vec::new(), &log, true);

        let err = reconciler.reconcile().await.unwrap_err();

        assert!(matches!(err, SchedulerError::Observation(_)));
        assert_eq!(log.lock().unwrap().clone(), vec!["observe"]);
    }

    #[tokio::test]
    async fn concurrent_triggers_never_interleave() {
        let log: EventLog = Arc::default();
        // empty snapshot, so every cycle creates two instances
        let reconciler = Arc::new(reconciler(
            vec![problem("110", 2, 0)],
            Vec::new(),
            &log,
            false,
        ));

        let first = tokio::spawn({
            let reconciler = reconciler.clone();
            async move { reconciler.reconcile().await }
        });
        let second = tokio::spawn({
            let reconciler = reconciler.clone();
            async move { reconciler.reconcile().await }
        });

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "observe",
                "create image-110",
                "create image-110",
                "observe",
                "create image-110",
                "create image-110",
            ]
        );
    }
}
