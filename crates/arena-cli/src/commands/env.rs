//! Observed problem-environment commands

use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use arena_scoreserver::{EnvironmentSource, ScoreserverClient};
use arena_types::{ArenaConfig, ProblemEnvironment};
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

/// Environment subcommands
#[derive(Subcommand)]
pub enum EnvCommands {
    /// List observed problem environments
    List,

    /// Get one problem environment by name
    Get {
        /// Environment name
        name: String,
    },
}

/// Table row for environment display
#[derive(Debug, Serialize, Tabled)]
struct EnvironmentRow {
    /// Environment name
    name: String,
    /// Problem id on the scoring service
    problem: String,
    /// Lifecycle inner status
    status: String,
    /// Placement
    zone: String,
    /// Age since creation
    age: String,
}

impl From<ProblemEnvironment> for EnvironmentRow {
    fn from(env: ProblemEnvironment) -> Self {
        let status = env
            .inner_status
            .wire_name()
            .unwrap_or("UNCLASSIFIED")
            .to_string();
        let age = humanize_duration(chrono::Utc::now() - env.created_at);

        Self {
            name: env.name,
            problem: env.problem_id,
            status,
            zone: format!("{}/{}", env.project, env.zone),
            age,
        }
    }
}

fn humanize_duration(duration: chrono::Duration) -> String {
    if duration.num_days() > 0 {
        format!("{}d", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m", duration.num_minutes())
    } else {
        format!("{}s", duration.num_seconds())
    }
}

/// Execute an environment command
pub async fn execute(
    command: EnvCommands,
    config: &ArenaConfig,
    format: OutputFormat,
) -> CliResult<()> {
    let client = ScoreserverClient::new(&config.scoreserver.endpoint)?;

    match command {
        EnvCommands::List => {
            let environments = client.list_environments().await?;
            let rows: Vec<EnvironmentRow> =
                environments.into_iter().map(EnvironmentRow::from).collect();
            output::print_rows(rows, format);
            Ok(())
        }

        EnvCommands::Get { name } => {
            let environment = client.get_environment(&name).await?;
            output::print_report(&environment, format);
            Ok(())
        }
    }
}
