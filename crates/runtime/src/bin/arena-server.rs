//! Process entry point: initializes logging and drives the scheduler forever.
//!
//! This binary is deliberately thin. It owns none of the simulation logic —
//! it wires up a [`Scheduler`], hands its handle to nothing yet (no
//! transport layer lives in this crate), and keeps the tick loop alive under
//! a real wall clock until the process receives a shutdown signal.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use arena_core::WorldConfig;
use arena_runtime::Scheduler;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = setup_logging()?;

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs_f64();
    let (scheduler, handle) = Scheduler::new(WorldConfig::default(), now, 256);

    tracing::info!(tick_rate_hz = WorldConfig::default().tick_rate_hz, "arena-server starting");

    let run = tokio::spawn(scheduler.run());
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    handle.shutdown().await.ok();
    run.await?;

    Ok(())
}

/// Logs to stderr and to a rolling daily file under `./logs`. Returns the
/// non-blocking writer's guard; it must stay alive for the process lifetime.
fn setup_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily("logs", "arena-server.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let file_layer = tracing_subscriber::fmt::layer().with_writer(non_blocking_file).with_ansi(false);

    tracing_subscriber::registry().with(env_filter).with(stderr_layer).with(file_layer).init();

    Ok(guard)
}
