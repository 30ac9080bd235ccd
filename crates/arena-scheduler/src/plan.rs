//! Convergence planning: aggregated counters into create and delete lists

use arena_types::{CreationTarget, DeletionTarget, KeptInstance, Problem};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// The work one cycle intends to do. Consumed once by the executor;
/// never carried across cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    /// Instances to bring up, in pool-registry order
    pub creations: Vec<CreationTarget>,

    /// Surplus instances to tear down, newest first per pool
    pub deletions: Vec<DeletionTarget>,
}

/// Creation-time descending: surplus trimming discards the most recently
/// created instances first, the ones least likely to be claimed.
fn creation_time_descending(a: &KeptInstance, b: &KeptInstance) -> Ordering {
    b.created_at.cmp(&a.created_at)
}

/// Plan creations and deletions so each pool's Ready+NotReady population
/// converges on its keep_pool. Pure function of the registry; per-pool
/// arithmetic runs on local copies and the caller's counters stay as
/// observed.
pub fn plan(problems: &BTreeMap<String, Problem>) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();

    for problem in problems.values() {
        plan_problem(problem, &mut plan);
    }

    plan
}

fn plan_problem(problem: &Problem, plan: &mut ReconcilePlan) {
    let mut candidates: Vec<KeptInstance> = problem
        .kept_instances
        .iter()
        .filter(|kept| kept.status.is_deletion_candidate())
        .cloned()
        .collect();
    candidates.sort_by(creation_time_descending);
    let mut candidates = candidates.into_iter();

    let mut pooled = problem.pooled();
    let mut current = problem.current_instance;

    // Trim surplus, gated on the standing-population floor. Stopping at
    // the floor can leave surplus unhandled; that is the intended trade.
    while pooled > problem.keep_pool && current > problem.default_instance {
        let Some(candidate) = candidates.next() else {
            break;
        };

        plan.deletions.push(DeletionTarget {
            problem_name: problem.name.clone(),
            instance_name: candidate.instance_name,
            project: candidate.project,
            zone: candidate.zone,
        });
        pooled -= 1;
        current -= 1;
    }

    // Fill the deficit. Placement is decided later against zone capacity.
    while pooled < problem.keep_pool {
        plan.creations.push(CreationTarget {
            problem_name: problem.name.clone(),
            problem_id: problem.problem_id.clone(),
            machine_image_name: problem.machine_image_name.clone(),
        });
        pooled += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_types::{InnerStatus, ProblemConfig};
    use chrono::{Duration, Utc};

    fn problem(keep_pool: u32, default_instance: u32) -> Problem {
        Problem::from_config(&ProblemConfig {
            name: "110".into(),
            problem_id: "p-110".into(),
            machine_image_name: "image-110".into(),
            keep_pool,
            default_instance,
        })
    }

    fn kept(name: &str, status: InnerStatus, age_minutes: i64) -> KeptInstance {
        KeptInstance {
            instance_name: name.into(),
            project: "contest-prod".into(),
            zone: "zone-a".into(),
            status,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    fn registry(problem: Problem) -> BTreeMap<String, Problem> {
        BTreeMap::from([(problem.machine_image_name.clone(), problem)])
    }

    #[test]
    fn surplus_deletes_newest_ready_first() {
        // keep_pool 3, five ready, two teams mid-challenge
        let mut p = problem(3, 1);
        p.ready = 5;
        p.under_challenge = 2;
        p.current_instance = 7;
        p.kept_instances = vec![
            kept("oldest", InnerStatus::Ready, 500),
            kept("mid", InnerStatus::Ready, 300),
            kept("newer", InnerStatus::Ready, 60),
            kept("newest", InnerStatus::Ready, 5),
            kept("older", InnerStatus::Ready, 400),
        ];

        let plan = plan(&registry(p));

        assert!(plan.creations.is_empty());
        let names: Vec<&str> = plan
            .deletions
            .iter()
            .map(|d| d.instance_name.as_str())
            .collect();
        assert_eq!(names, vec!["newest", "newer"]);
    }

    #[test]
    fn deficit_creates_exactly_the_missing_count() {
        let mut p = problem(2, 2);
        p.current_instance = 0;

        let plan = plan(&registry(p));

        assert!(plan.deletions.is_empty());
        assert_eq!(plan.creations.len(), 2);
        assert!(plan
            .creations
            .iter()
            .all(|c| c.machine_image_name == "image-110" && c.problem_id == "p-110"));
    }

    #[test]
    fn deletions_stop_at_the_population_floor() {
        // surplus of 3 but the floor only allows one deletion
        let mut p = problem(1, 3);
        p.ready = 4;
        p.current_instance = 4;
        p.kept_instances = vec![
            kept("a", InnerStatus::Ready, 40),
            kept("b", InnerStatus::Ready, 30),
            kept("c", InnerStatus::Ready, 20),
            kept("d", InnerStatus::Ready, 10),
        ];

        let plan = plan(&registry(p));

        assert_eq!(plan.deletions.len(), 1);
        assert!(plan.creations.is_empty());
    }

    #[test]
    fn at_the_floor_nothing_is_deleted() {
        let mut p = problem(1, 3);
        p.ready = 3;
        p.current_instance = 3;
        p.kept_instances = vec![
            kept("a", InnerStatus::Ready, 30),
            kept("b", InnerStatus::Ready, 20),
            kept("c", InnerStatus::Ready, 10),
        ];

        let plan = plan(&registry(p));

        assert!(plan.deletions.is_empty());
        assert!(plan.creations.is_empty());
    }

    #[test]
    fn assigned_instances_are_never_deletion_candidates() {
        let mut p = problem(1, 0);
        p.ready = 2;
        p.under_challenge = 1;
        p.under_scoring = 1;
        p.current_instance = 4;
        // defensive filter: even if non-pool entries leak into the kept
        // list they must not be selected
        p.kept_instances = vec![
            kept("ready-new", InnerStatus::Ready, 5),
            kept("challenge", InnerStatus::UnderChallenge, 1),
            kept("scoring", InnerStatus::UnderScoring, 2),
            kept("ready-old", InnerStatus::Ready, 100),
        ];

        let plan = plan(&registry(p));

        assert_eq!(plan.deletions.len(), 1);
        assert_eq!(plan.deletions[0].instance_name, "ready-new");
    }

    #[test]
    fn deletions_run_out_when_candidates_do() {
        // surplus comes from not_ready instances with no kept records
        let mut p = problem(1, 0);
        p.ready = 1;
        p.not_ready = 2;
        p.current_instance = 3;
        p.kept_instances = vec![kept("only", InnerStatus::Ready, 10)];

        let plan = plan(&registry(p));

        assert_eq!(plan.deletions.len(), 1);
        assert!(plan.creations.is_empty());
    }

    #[test]
    fn converged_pool_plans_nothing() {
        let mut p = problem(3, 1);
        p.ready = 2;
        p.not_ready = 1;
        p.current_instance = 3;
        p.kept_instances = vec![
            kept("a", InnerStatus::Ready, 30),
            kept("b", InnerStatus::Ready, 20),
        ];

        let plan = plan(&registry(p));

        assert!(plan.creations.is_empty());
        assert!(plan.deletions.is_empty());
    }

    #[test]
    fn pools_are_planned_independently() {
        let mut surplus = problem(1, 0);
        surplus.ready = 2;
        surplus.current_instance = 2;
        surplus.kept_instances = vec![
            kept("s-new", InnerStatus::Ready, 1),
            kept("s-old", InnerStatus::Ready, 60),
        ];

        let mut deficit = Problem::from_config(&ProblemConfig {
            name: "205".into(),
            problem_id: "p-205".into(),
            machine_image_name: "image-205".into(),
            keep_pool: 2,
            default_instance: 0,
        });
        deficit.ready = 1;
        deficit.current_instance = 1;

        let registry = BTreeMap::from([
            (surplus.machine_image_name.clone(), surplus),
            (deficit.machine_image_name.clone(), deficit),
        ]);

        let plan = plan(&registry);

        assert_eq!(plan.deletions.len(), 1);
        assert_eq!(plan.deletions[0].instance_name, "s-new");
        assert_eq!(plan.creations.len(), 1);
        assert_eq!(plan.creations[0].machine_image_name, "image-205");
    }
}
