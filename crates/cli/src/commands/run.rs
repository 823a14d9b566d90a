//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{BufferConfig, SensorConfig, StationBlueprint};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Station, StationConfig};

/// Execute the `run` command
pub async fn run_station(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    apply_overrides(&mut blueprint, args)?;

    info!(
        sensor = %blueprint.sensor.kind(),
        buffer = %blueprint.buffer.kind(),
        format = blueprint.poller.format.as_str(),
        writer_interval_ms = blueprint.writer.interval_ms,
        poll_interval_ms = blueprint.schedule.interval_ms,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let station_config = StationConfig {
        blueprint,
        max_polls: if args.max_polls == 0 {
            None
        } else {
            Some(args.max_polls)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Setup graceful shutdown handler
    let shutdown = CancellationToken::new();
    let signal_task = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            warn!("Received shutdown signal, stopping station...");
            shutdown.cancel();
        })
    };

    info!("Starting station...");

    let result = Station::new(station_config).run(shutdown).await;
    signal_task.abort();

    let stats = result.context("Station execution failed")?;
    info!(
        polls = stats.poll_attempts,
        records = stats.records_delivered,
        duration_secs = stats.duration.as_secs_f64(),
        records_per_sec = format!("{:.2}", stats.records_per_sec()),
        "Station completed successfully"
    );

    // Print detailed statistics
    stats.print_summary();

    info!("Telemetry Poller finished");
    Ok(())
}

/// Apply command-line overrides on top of the loaded configuration
fn apply_overrides(blueprint: &mut StationBlueprint, args: &RunArgs) -> Result<()> {
    if let Some(interval_ms) = args.interval_ms {
        if interval_ms == 0 {
            anyhow::bail!("--interval-ms must be > 0");
        }
        info!(interval_ms, "Overriding poll interval from CLI");
        blueprint.schedule.interval_ms = interval_ms;
    }
    if let Some(ref checkpoint) = args.checkpoint {
        info!(checkpoint = %checkpoint.display(), "Overriding checkpoint path from CLI");
        blueprint.schedule.checkpoint_path = Some(checkpoint.clone());
    }
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &StationBlueprint) {
    println!("\n=== Configuration Summary ===\n");

    println!("Sensor: {}", blueprint.sensor.kind());
    match &blueprint.sensor {
        SensorConfig::Device(device) => {
            println!("  Port: {} @ {} baud", device.port, device.baud_rate);
            println!("  Read timeout: {}ms", device.read_timeout_ms);
        }
        SensorConfig::Replay(replay) => {
            println!("  File: {}", replay.path.display());
            println!("  Lines per fetch: {}", replay.lines_per_fetch);
        }
        SensorConfig::Synthetic(synthetic) => {
            println!("  Shape: {:?}", synthetic.shape);
            if let Some(seed) = synthetic.seed {
                println!("  Seed: {}", seed);
            }
        }
    }

    println!("\nBuffer: {}", blueprint.buffer.kind());
    match &blueprint.buffer {
        BufferConfig::File(file) => println!("  Path: {}", file.path.display()),
        BufferConfig::Memory(memory) => match memory.capacity {
            Some(capacity) => println!("  Capacity: {}", capacity),
            None => println!("  Capacity: unbounded"),
        },
    }

    println!("\nWriter interval: {}ms", blueprint.writer.interval_ms);
    println!(
        "Poller: {} (timeout {}ms)",
        blueprint.poller.format.as_str(),
        blueprint.poller.timeout_ms
    );
    println!(
        "Schedule: every {}ms, retry after {}ms",
        blueprint.schedule.interval_ms, blueprint.schedule.retry_delay_ms
    );
    if let Some(ref path) = blueprint.schedule.checkpoint_path {
        println!("  Checkpoint: {}", path.display());
    }

    println!();
}
