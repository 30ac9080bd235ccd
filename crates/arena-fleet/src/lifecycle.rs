//! Write seam over the fleet-lifecycle service

use crate::error::FleetResult;
use arena_types::Instance;
use async_trait::async_trait;

/// Instance creation and teardown. The scheduler's executor drives this
/// as a trait object; tests substitute a scripted fake to exercise the
/// partial-failure paths without a live service.
#[async_trait]
pub trait FleetLifecycle: Send + Sync {
    /// Boot one instance from a machine image in the given placement.
    /// Returns one access record per exposed service.
    async fn create_instance(
        &self,
        problem_id: &str,
        machine_image_name: &str,
        project: &str,
        zone: &str,
    ) -> FleetResult<Vec<Instance>>;

    /// Tear down one instance by name.
    async fn delete_instance(
        &self,
        instance_name: &str,
        project: &str,
        zone: &str,
    ) -> FleetResult<()>;
}
