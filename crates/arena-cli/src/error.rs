//! CLI error types

use arena_fleet::FleetError;
use arena_scheduler::SchedulerError;
use arena_scoreserver::ScoreserverError;
use thiserror::Error;

/// Result alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Everything the binary can fail with, folded into one surface
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be read or merged
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration loaded but violates a cross-field constraint
    #[error("invalid configuration: {0}")]
    Validation(#[from] arena_types::ConfigError),

    #[error(transparent)]
    Scoreserver(#[from] ScoreserverError),

    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// Mapping file could not be read
    #[error("cannot read mapping file: {0}")]
    MappingIo(#[from] std::io::Error),

    /// Mapping file is not valid YAML of the expected shape
    #[error("malformed mapping file: {0}")]
    MappingParse(#[from] serde_yaml::Error),

    /// A mapping entry is missing a required field
    #[error("mapping entry {index}: {field} must not be empty")]
    MappingField { index: usize, field: &'static str },

    /// A bootstrap creation kept failing after every retry
    #[error("instance creation for problem {problem_id} failed after {attempts} attempt(s): {source}")]
    InitExhausted {
        problem_id: String,
        attempts: u32,
        #[source]
        source: FleetError,
    },
}
