//! Direct fleet-lifecycle commands

use crate::error::CliResult;
use crate::output::{print_error, print_success};
use arena_fleet::{FleetClient, FleetLifecycle};
use arena_types::ArenaConfig;
use clap::Subcommand;

/// Fleet subcommands
#[derive(Subcommand)]
pub enum FleetCommands {
    /// Create one instance, bypassing the scheduler
    Create {
        /// Problem id on the scoring service
        #[arg(long)]
        problem_id: String,

        /// Machine image to create from
        #[arg(long)]
        machine_image_name: String,

        /// Cloud project
        #[arg(long)]
        project: String,

        /// Placement zone
        #[arg(long)]
        zone: String,
    },

    /// Delete one instance
    Delete {
        /// Instance name
        instance_name: String,

        /// Cloud project
        #[arg(long)]
        project: String,

        /// Placement zone
        #[arg(long)]
        zone: String,

        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Execute a fleet command
pub async fn execute(command: FleetCommands, config: &ArenaConfig) -> CliResult<()> {
    let client = FleetClient::new(&config.fleet.endpoint, &config.fleet.credential)?;

    match command {
        FleetCommands::Create {
            problem_id,
            machine_image_name,
            project,
            zone,
        } => {
            let instances = client
                .create_instance(&problem_id, &machine_image_name, &project, &zone)
                .await?;

            for instance in &instances {
                print_success(&format!("Created instance: {}", instance.instance_name));
            }
            Ok(())
        }

        FleetCommands::Delete {
            instance_name,
            project,
            zone,
            yes,
        } => {
            if !yes {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Delete instance {} in {}/{}?",
                        instance_name, project, zone
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false);

                if !confirm {
                    print_error("Aborted");
                    return Ok(());
                }
            }

            client.delete_instance(&instance_name, &project, &zone).await?;
            print_success(&format!("Deleted instance: {}", instance_name));
            Ok(())
        }
    }
}
