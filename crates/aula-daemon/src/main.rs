//! aula daemon — records lecture-hall live streams on a weekly schedule,
//! continuously reconciling the live timers against the schedule file.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use aula_capture::CaptureExecutor;
use aula_core::{AulaConfig, ScheduleLoader};
use aula_scheduler::{Reconciler, TimerRegistry};
use chrono::Utc;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "aula-daemon",
    version,
    about = "Unattended weekly recorder for lecture-hall live streams"
)]
struct Cli {
    /// Path to aula.toml. Defaults are used when the file is absent.
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // config path: explicit flag > AULA_CONFIG env > ./aula.toml
    let cli = Cli::parse();
    let config_path = cli.config.or_else(|| std::env::var("AULA_CONFIG").ok());
    let config = AulaConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({e}), using defaults");
        AulaConfig::default()
    });

    // The one fatal configuration error: without a valid zone no trigger
    // time can be computed.
    let tz = config.daemon.tz().context("daemon.timezone")?;

    info!(
        schedule = %config.schedule.path,
        storage = %config.storage.root,
        timezone = %config.daemon.timezone,
        "aula daemon starting"
    );

    let loader = ScheduleLoader::new(config.schedule.path.clone());
    let executor = Arc::new(CaptureExecutor::new(&config.capture, &config.storage));
    let mut registry = TimerRegistry::new();
    let mut reconciler = Reconciler::new(tz);

    // Initial pass populates the live schedule before the first pump tick.
    reconciler.reconcile(&mut registry, &loader.load());

    let mut poll = tokio::time::interval(Duration::from_secs(config.daemon.poll_interval_secs));
    let mut reconcile =
        tokio::time::interval(Duration::from_secs(config.daemon.reconcile_interval_secs));

    info!(
        live = registry.len(),
        "scheduler running, press Ctrl+C to stop"
    );

    loop {
        tokio::select! {
            _ = poll.tick() => {
                for request in registry.run_pending(Utc::now()) {
                    // One task per firing: a long or stuck capture must never
                    // stall the pump, reconciliation, or other firings. The
                    // request is a snapshot — removing the job mid-recording
                    // only cancels future firings.
                    let executor = Arc::clone(&executor);
                    tokio::spawn(async move { executor.record(&request).await });
                }
            }
            _ = reconcile.tick() => {
                // Passes are strictly serialized: both arms run on this task,
                // and the reconciler is the registry's only writer.
                reconciler.reconcile(&mut registry, &loader.load());
            }
            _ = signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}
