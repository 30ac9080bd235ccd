//! Plan execution against the fleet-lifecycle service
//!
//! Every fleet call is preceded by a fixed pacing delay; the service
//! mishandles rapid successive connections, so the delay is backpressure,
//! not retry logic. Deletions absorb failures, creations do not.

use crate::error::{SchedulerError, SchedulerResult};
use arena_fleet::FleetLifecycle;
use arena_types::{CreationTarget, DeletionTarget, ZonePriority};
use std::cmp::Ordering;
use std::time::Duration;

/// Priority ascending, lower numbers place first. Applied with a stable
/// sort so zones sharing a priority keep their configuration order.
fn priority_ascending(a: &ZonePriority, b: &ZonePriority) -> Ordering {
    a.priority.cmp(&b.priority)
}

/// Delete every target in order, pacing each call. A failed call stops
/// this deletion pass and logs the remaining targets; the next cycle will
/// re-plan them. Returns how many deletions were applied.
pub async fn run_deletions(
    fleet: &dyn FleetLifecycle,
    targets: &[DeletionTarget],
    delay: Duration,
) -> usize {
    for (index, target) in targets.iter().enumerate() {
        tokio::time::sleep(delay).await;

        match fleet
            .delete_instance(&target.instance_name, &target.project, &target.zone)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    problem = %target.problem_name,
                    instance = %target.instance_name,
                    project = %target.project,
                    zone = %target.zone,
                    "Deleted instance"
                );
            }
            Err(error) => {
                let remaining: Vec<String> = targets[index..]
                    .iter()
                    .map(|t| format!("{}: {}", t.problem_name, t.instance_name))
                    .collect();
                tracing::error!(
                    error = %error,
                    remaining = %remaining.join(", "),
                    "Instance deletion failed, postponing the remaining targets to the next cycle"
                );
                return index;
            }
        }
    }

    targets.len()
}

/// Place every pending creation into a zone with spare capacity, walking
/// zones by ascending priority and filling each before moving on. Zone
/// occupancy is updated as instances land. A failed create aborts the
/// cycle with every unplaced problem named; running out of zone capacity
/// does the same.
pub async fn run_creations(
    fleet: &dyn FleetLifecycle,
    creations: &[CreationTarget],
    zones: &mut [ZonePriority],
    delay: Duration,
) -> SchedulerResult<()> {
    zones.sort_by(priority_ascending);

    let mut next = 0;
    for zone in zones.iter_mut() {
        while zone.available() > 0 && next < creations.len() {
            let target = &creations[next];
            tokio::time::sleep(delay).await;

            match fleet
                .create_instance(
                    &target.problem_id,
                    &target.machine_image_name,
                    &zone.project,
                    &zone.zone,
                )
                .await
            {
                Ok(created) => {
                    let instance_name = created
                        .first()
                        .map(|i| i.instance_name.clone())
                        .unwrap_or_default();
                    tracing::info!(
                        problem = %target.problem_name,
                        instance = %instance_name,
                        project = %zone.project,
                        zone = %zone.zone,
                        "Created instance"
                    );
                    zone.occupy();
                    next += 1;
                }
                Err(source) => {
                    return Err(SchedulerError::Creation {
                        source,
                        pending: pending_problems(&creations[next..]),
                    });
                }
            }
        }

        if next >= creations.len() {
            break;
        }
    }

    if next < creations.len() {
        return Err(SchedulerError::CapacityExhausted {
            pending: pending_problems(&creations[next..]),
        });
    }

    Ok(())
}

fn pending_problems(targets: &[CreationTarget]) -> Vec<String> {
    targets.iter().map(|t| t.problem_name.clone()).collect()
}
