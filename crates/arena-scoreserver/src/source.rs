//! Read seam over the scoring service

use crate::error::ScoreserverResult;
use arena_types::ProblemEnvironment;
use async_trait::async_trait;

/// Read-only access to the environment records the scheduler converges on.
/// The scheduler takes this as a trait object so cycles can run against a
/// fake source in tests.
#[async_trait]
pub trait EnvironmentSource: Send + Sync {
    /// Fetch every environment record known to the scoring service.
    async fn list_environments(&self) -> ScoreserverResult<Vec<ProblemEnvironment>>;

    /// Fetch a single environment by name.
    async fn get_environment(&self, name: &str) -> ScoreserverResult<ProblemEnvironment>;
}
