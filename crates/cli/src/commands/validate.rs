//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{BufferConfig, SensorConfig, StationBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    sensor: String,
    buffer: String,
    line_format: String,
    writer_interval_ms: u64,
    poll_interval_ms: u64,
    checkpoint: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    sensor: blueprint.sensor.kind().to_string(),
                    buffer: blueprint.buffer.kind().to_string(),
                    line_format: blueprint.poller.format.as_str().to_string(),
                    writer_interval_ms: blueprint.writer.interval_ms,
                    poll_interval_ms: blueprint.schedule.interval_ms,
                    checkpoint: blueprint.schedule.checkpoint_path.is_some(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &StationBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    // Durability
    if let BufferConfig::Memory(_) = blueprint.buffer {
        warnings.push(
            "buffer.kind = \"memory\" is not durable - buffered lines are lost on restart"
                .to_string(),
        );
        if blueprint.schedule.checkpoint_path.is_some() {
            warnings.push(
                "schedule.checkpoint_path is set but the memory buffer does not survive restarts"
                    .to_string(),
            );
        }
    }

    // Format mismatch
    if let SensorConfig::Synthetic(ref synthetic) = blueprint.sensor {
        let expected = synthetic.shape.line_format();
        if expected != blueprint.poller.format {
            warnings.push(format!(
                "synthetic shape {:?} produces {} lines but poller.format is {} - every line will be dropped",
                synthetic.shape,
                expected.as_str(),
                blueprint.poller.format.as_str()
            ));
        }
    }

    // Cadence
    if blueprint.poller.timeout_ms > blueprint.schedule.interval_ms {
        warnings.push(format!(
            "poller.timeout_ms ({}) exceeds schedule.interval_ms ({}) - slow polls will delay the next tick",
            blueprint.poller.timeout_ms, blueprint.schedule.interval_ms
        ));
    }

    if blueprint.schedule.checkpoint_path.is_none() {
        warnings.push(
            "schedule.checkpoint_path is not set - the watermark restarts empty after a restart"
                .to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Sensor: {}", summary.sensor);
            println!("  Buffer: {}", summary.buffer);
            println!("  Line format: {}", summary.line_format);
            println!("  Writer interval: {}ms", summary.writer_interval_ms);
            println!("  Poll interval: {}ms", summary.poll_interval_ms);
            println!("  Checkpoint: {}", if summary.checkpoint { "yes" } else { "no" });
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
