//! State aggregation: one observed snapshot into per-pool and per-zone counters

use arena_types::{
    ArenaConfig, DeletionTarget, InnerStatus, KeptInstance, Problem, ProblemEnvironment,
    ZonePriority,
};
use std::collections::BTreeMap;

/// Everything one observation pass produces. Rebuilt from zero every
/// cycle; comparing two passes over the same snapshot yields equality.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateState {
    /// Pool registry keyed by machine image name
    pub problems: BTreeMap<String, Problem>,

    /// Zone occupancy, in configuration order
    pub zones: Vec<ZonePriority>,

    /// Abandoned instances due for deletion ahead of any planning
    pub abandoned: Vec<DeletionTarget>,
}

/// Tally an observed snapshot against configured policy.
///
/// Pools are resolved by machine image name first, then by problem id as
/// a fallback when the observed image name is missing or drifted; the
/// configured identity always wins. Environments matching no configured
/// pool are logged and skipped, as are placements in unconfigured zones.
pub fn aggregate(config: &ArenaConfig, environments: &[ProblemEnvironment]) -> AggregateState {
    let mut problems: BTreeMap<String, Problem> = config
        .problems
        .iter()
        .map(|p| (p.machine_image_name.clone(), Problem::from_config(p)))
        .collect();

    // secondary index for drifted image names
    let id_index: BTreeMap<String, String> = config
        .problems
        .iter()
        .map(|p| (p.problem_id.clone(), p.machine_image_name.clone()))
        .collect();

    let mut zones: Vec<ZonePriority> = config
        .projects
        .iter()
        .flat_map(|project| {
            project
                .zones
                .iter()
                .map(|zone| ZonePriority::from_config(&project.name, zone))
        })
        .collect();

    let mut abandoned = Vec::new();

    for env in environments {
        let Some(image_key) = resolve_pool(&problems, &id_index, env) else {
            tracing::warn!(
                environment = %env.name,
                machine_image = env.machine_image_name.as_deref().unwrap_or(""),
                problem_id = %env.problem_id,
                "Environment matches no configured problem pool, skipping"
            );
            continue;
        };

        // resolve_pool only returns keys present in the registry
        let Some(problem) = problems.get_mut(&image_key) else {
            continue;
        };

        problem.record(env.inner_status);

        if env.inner_status.is_pool_ready() {
            problem.kept_instances.push(KeptInstance {
                instance_name: env.name.clone(),
                project: env.project.clone(),
                zone: env.zone.clone(),
                status: env.inner_status,
                created_at: env.created_at,
            });
        }

        if env.inner_status == InnerStatus::Abandoned {
            abandoned.push(DeletionTarget {
                problem_name: problem.name.clone(),
                instance_name: env.name.clone(),
                project: env.project.clone(),
                zone: env.zone.clone(),
            });
        }

        match zones
            .iter_mut()
            .find(|z| z.project == env.project && z.zone == env.zone)
        {
            Some(zone) => zone.occupy(),
            None => {
                tracing::debug!(
                    environment = %env.name,
                    project = %env.project,
                    zone = %env.zone,
                    "Environment placed in an unconfigured zone"
                );
            }
        }
    }

    AggregateState {
        problems,
        zones,
        abandoned,
    }
}

/// Map one environment onto a configured pool, or `None` for strays.
fn resolve_pool(
    problems: &BTreeMap<String, Problem>,
    id_index: &BTreeMap<String, String>,
    env: &ProblemEnvironment,
) -> Option<String> {
    if let Some(image) = env.machine_image_name.as_deref() {
        if let Some(problem) = problems.get(image) {
            if problem.problem_id != env.problem_id {
                tracing::warn!(
                    environment = %env.name,
                    machine_image = %image,
                    observed_problem_id = %env.problem_id,
                    configured_problem_id = %problem.problem_id,
                    "Observed problem id diverges from configuration, configured value wins"
                );
            }
            return Some(image.to_string());
        }
    }

    let image_key = id_index.get(&env.problem_id)?;
    tracing::warn!(
        environment = %env.name,
        observed_machine_image = env.machine_image_name.as_deref().unwrap_or(""),
        configured_machine_image = %image_key,
        problem_id = %env.problem_id,
        "Observed machine image diverges from configuration, resolved pool by problem id"
    );
    Some(image_key.clone())
}

/// Emit the per-pool and per-zone counters before planning, the operator's
/// view of what this cycle saw.
pub fn log_snapshot(state: &AggregateState) {
    for (image, problem) in &state.problems {
        tracing::info!(
            machine_image = %image,
            problem = %problem.name,
            problem_id = %problem.problem_id,
            ready = problem.ready,
            not_ready = problem.not_ready,
            under_challenge = problem.under_challenge,
            under_scoring = problem.under_scoring,
            abandoned = problem.abandoned,
            current = problem.current_instance,
            keep_pool = problem.keep_pool,
            default_instance = problem.default_instance,
            "Problem pool observed"
        );
    }

    for zone in &state.zones {
        tracing::info!(
            project = %zone.project,
            zone = %zone.zone,
            priority = zone.priority,
            current = zone.current_instance,
            max = zone.max_instance,
            "Zone occupancy observed"
        );
    }
}
