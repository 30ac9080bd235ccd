//! arena - contest VM fleet keeper CLI
//!
//! This binary gives contest operators a terminal interface to:
//! - Run the reconcile scheduler, one-shot or on an interval
//! - Inspect aggregated pool state and pending plans without executing
//! - List and fetch observed problem environments
//! - Create and delete instances directly against the fleet service
//! - Pre-populate instances before a contest from a mapping file

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;

use commands::{contest, env, fleet, scheduler};
use error::CliResult;

/// arena CLI application
#[derive(Parser)]
#[command(name = "arena")]
#[command(about = "arena - contest VM fleet keeper", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ARENA_CONFIG")]
    config: Option<String>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table")]
    output: output::OutputFormat,

    /// Log level
    #[arg(long, env = "ARENA_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "ARENA_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run and inspect the reconcile scheduler
    Scheduler {
        #[command(subcommand)]
        command: scheduler::SchedulerCommands,
    },

    /// Inspect observed problem environments
    Env {
        #[command(subcommand)]
        command: env::EnvCommands,
    },

    /// Direct fleet-lifecycle operations
    Fleet {
        #[command(subcommand)]
        command: fleet::FleetCommands,
    },

    /// Contest bootstrap tooling
    Contest {
        #[command(subcommand)]
        command: contest::ContestCommands,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().without_time())
            .init();
    }

    // Load config
    let config = config::load(cli.config.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Scheduler { command } => scheduler::execute(command, &config, cli.output).await,
        Commands::Env { command } => env::execute(command, &config, cli.output).await,
        Commands::Fleet { command } => fleet::execute(command, &config).await,
        Commands::Contest { command } => contest::execute(command, &config).await,
    }
}
