//! Contest bootstrap commands

use crate::error::{CliError, CliResult};
use crate::output::{print_info, print_success};
use arena_fleet::{FleetClient, FleetLifecycle};
use arena_types::ArenaConfig;
use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Sleep between attempts at the same creation. The fleet service needs
/// breathing room after a refusal, not a hot retry.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Contest subcommands
#[derive(Subcommand)]
pub enum ContestCommands {
    /// Pre-create instances for every placement in a mapping file
    Init {
        /// YAML file listing the placements to create
        #[arg(short, long)]
        mapping_file: PathBuf,

        /// Instances to create per mapping entry
        #[arg(long, default_value = "1")]
        count: u32,

        /// Retries per failed creation before giving up
        #[arg(long, default_value = "3")]
        retries: u32,
    },
}

/// One row of the init mapping file
#[derive(Debug, Clone, Deserialize)]
struct MappingEntry {
    problem_id: String,
    machine_image_name: String,
    project: String,
    zone: String,
}

fn validate_mapping(entries: &[MappingEntry]) -> CliResult<()> {
    for (index, entry) in entries.iter().enumerate() {
        for (field, value) in [
            ("problem_id", &entry.problem_id),
            ("machine_image_name", &entry.machine_image_name),
            ("project", &entry.project),
            ("zone", &entry.zone),
        ] {
            if value.is_empty() {
                return Err(CliError::MappingField { index, field });
            }
        }
    }
    Ok(())
}

/// Execute a contest command
pub async fn execute(command: ContestCommands, config: &ArenaConfig) -> CliResult<()> {
    match command {
        ContestCommands::Init {
            mapping_file,
            count,
            retries,
        } => {
            let raw = std::fs::read_to_string(&mapping_file)?;
            let entries: Vec<MappingEntry> = serde_yaml::from_str(&raw)?;
            validate_mapping(&entries)?;

            let client = FleetClient::new(&config.fleet.endpoint, &config.fleet.credential)?;
            init_instances(&client, &entries, count, retries, config).await
        }
    }
}

async fn init_instances(
    client: &FleetClient,
    entries: &[MappingEntry],
    count: u32,
    retries: u32,
    config: &ArenaConfig,
) -> CliResult<()> {
    let total = entries.len() as u64 * u64::from(count);
    print_info(&format!(
        "Creating {} instance(s) across {} placement(s)...",
        total,
        entries.len()
    ));

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green} {pos}/{len} {msg}")
            .unwrap(),
    );

    let delay = config.scheduler.pacing.create_delay();
    for entry in entries {
        pb.set_message(entry.machine_image_name.clone());

        for _ in 0..count {
            tokio::time::sleep(delay).await;
            create_with_retry(client, entry, retries).await?;
            pb.inc(1);
        }
    }

    pb.finish_with_message("done");
    print_success(&format!(
        "Contest initialization complete: {} instance(s) created",
        total
    ));
    Ok(())
}

async fn create_with_retry(
    client: &FleetClient,
    entry: &MappingEntry,
    retries: u32,
) -> CliResult<()> {
    let mut attempt = 0;

    loop {
        attempt += 1;

        match client
            .create_instance(
                &entry.problem_id,
                &entry.machine_image_name,
                &entry.project,
                &entry.zone,
            )
            .await
        {
            Ok(_) => return Ok(()),
            Err(e) if attempt <= retries => {
                tracing::warn!(
                    problem_id = %entry.problem_id,
                    attempt,
                    error = %e,
                    "Instance creation failed, retrying"
                );
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(e) => {
                return Err(CliError::InitExhausted {
                    problem_id: entry.problem_id.clone(),
                    attempts: attempt,
                    source: e,
                });
            }
        }
    }
}
