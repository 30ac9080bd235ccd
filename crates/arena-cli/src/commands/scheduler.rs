//! Reconcile scheduler commands

use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use arena_fleet::FleetClient;
use arena_scheduler::Reconciler;
use arena_scoreserver::ScoreserverClient;
use arena_types::ArenaConfig;
use clap::Subcommand;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Scheduler subcommands
#[derive(Subcommand)]
pub enum SchedulerCommands {
    /// Run a single reconcile cycle
    Run,

    /// Reconcile on a fixed interval until interrupted
    Start {
        /// Seconds between cycles (defaults to the configured interval)
        #[arg(short, long)]
        interval_secs: Option<u64>,
    },

    /// Print aggregated state and pending plans without executing anything
    Dump,
}

/// Execute a scheduler command
pub async fn execute(
    command: SchedulerCommands,
    config: &ArenaConfig,
    format: OutputFormat,
) -> CliResult<()> {
    let reconciler = build_reconciler(config)?;

    match command {
        SchedulerCommands::Run => {
            reconciler.reconcile().await?;
            Ok(())
        }

        SchedulerCommands::Start { interval_secs } => {
            let secs = interval_secs.unwrap_or(config.scheduler.interval_secs);
            run_loop(reconciler, Duration::from_secs(secs)).await;
            Ok(())
        }

        SchedulerCommands::Dump => {
            let report = reconciler.dump().await?;
            output::print_report(&report, format);
            Ok(())
        }
    }
}

fn build_reconciler(config: &ArenaConfig) -> CliResult<Reconciler> {
    let source = ScoreserverClient::new(&config.scoreserver.endpoint)?;
    let fleet = FleetClient::new(&config.fleet.endpoint, &config.fleet.credential)?;

    Ok(Reconciler::new(
        config.clone(),
        Arc::new(source),
        Arc::new(fleet),
    ))
}

/// Reconcile every `period` until a shutdown signal arrives. Cycle errors
/// are logged and the loop keeps going; resilience comes from re-running
/// whole cycles, not from in-cycle retries.
async fn run_loop(reconciler: Reconciler, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    tracing::info!(interval_secs = period.as_secs(), "Scheduler loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = reconciler.reconcile().await {
                    tracing::error!(error = %e, "Reconcile cycle failed");
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Scheduler loop stopping");
                break;
            }
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
