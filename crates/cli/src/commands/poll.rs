//! `poll` command implementation.
//!
//! One poll against the configured buffer, printed as JSON. This is the
//! invocation boundary an external scheduler drives: it passes the last
//! watermark in and persists the returned `last_read` itself.

use anyhow::{Context, Result};
use contracts::BufferConfig;
use poller::WatermarkPoller;
use tracing::{info, warn};

use crate::cli::PollArgs;
use crate::error::CliError;

/// Execute the `poll` command
pub fn run_poll(args: &PollArgs) -> Result<()> {
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if matches!(blueprint.buffer, BufferConfig::Memory(_)) {
        warn!("memory buffer is empty in a fresh process; configure a file buffer to poll from the command line");
    }

    let buffer = ingestion::build_buffer(&blueprint.buffer).context("Failed to open buffer")?;
    let poller = WatermarkPoller::for_format(buffer, blueprint.poller.format);

    let batch = poller
        .poll_text(&args.watermark)
        .with_context(|| format!("Poll failed for watermark '{}'", args.watermark))?;

    info!(
        records = batch.len(),
        last_read = %batch.last_read,
        "Poll complete"
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&batch)
    } else {
        serde_json::to_string(&batch)
    }
    .context("Failed to serialize batch")?;
    println!("{}", json);

    Ok(())
}
