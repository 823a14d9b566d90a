//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{BufferConfig, SensorConfig, StationBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    sensor: SensorInfo,
    buffer: BufferInfo,
    writer_interval_ms: u64,
    poller: PollerInfo,
    schedule: ScheduleInfo,
}

#[derive(Serialize)]
struct SensorInfo {
    kind: String,
    /// Port, replay file or synthetic shape
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    baud_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lines_per_fetch: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct BufferInfo {
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    capacity: Option<usize>,
    durable: bool,
}

#[derive(Serialize)]
struct PollerInfo {
    format: String,
    timeout_ms: u64,
}

#[derive(Serialize)]
struct ScheduleInfo {
    interval_ms: u64,
    retry_delay_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    checkpoint_path: Option<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn build_config_info(blueprint: &StationBlueprint) -> ConfigInfo {
    let sensor = match &blueprint.sensor {
        SensorConfig::Device(device) => SensorInfo {
            kind: blueprint.sensor.kind().to_string(),
            source: device.port.clone(),
            baud_rate: Some(device.baud_rate),
            lines_per_fetch: None,
            seed: None,
        },
        SensorConfig::Replay(replay) => SensorInfo {
            kind: blueprint.sensor.kind().to_string(),
            source: replay.path.display().to_string(),
            baud_rate: None,
            lines_per_fetch: Some(replay.lines_per_fetch),
            seed: None,
        },
        SensorConfig::Synthetic(synthetic) => SensorInfo {
            kind: blueprint.sensor.kind().to_string(),
            source: synthetic.shape.line_format().as_str().to_string(),
            baud_rate: None,
            lines_per_fetch: None,
            seed: synthetic.seed,
        },
    };

    let buffer = match &blueprint.buffer {
        BufferConfig::File(file) => BufferInfo {
            kind: blueprint.buffer.kind().to_string(),
            path: Some(file.path.display().to_string()),
            capacity: None,
            durable: true,
        },
        BufferConfig::Memory(memory) => BufferInfo {
            kind: blueprint.buffer.kind().to_string(),
            path: None,
            capacity: memory.capacity,
            durable: false,
        },
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        sensor,
        buffer,
        writer_interval_ms: blueprint.writer.interval_ms,
        poller: PollerInfo {
            format: blueprint.poller.format.as_str().to_string(),
            timeout_ms: blueprint.poller.timeout_ms,
        },
        schedule: ScheduleInfo {
            interval_ms: blueprint.schedule.interval_ms,
            retry_delay_ms: blueprint.schedule.retry_delay_ms,
            checkpoint_path: blueprint
                .schedule
                .checkpoint_path
                .as_ref()
                .map(|p| p.display().to_string()),
        },
    }
}

fn print_config_info(blueprint: &StationBlueprint) {
    let info = build_config_info(blueprint);

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Telemetry Station Configuration                ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📡 Sensor");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Kind: {}", info.sensor.kind);
    if let Some(baud_rate) = info.sensor.baud_rate {
        println!("   ├─ Baud rate: {}", baud_rate);
    }
    if let Some(lines) = info.sensor.lines_per_fetch {
        println!("   ├─ Lines per fetch: {}", lines);
    }
    if let Some(seed) = info.sensor.seed {
        println!("   ├─ Seed: {}", seed);
    }
    println!("   └─ Source: {}", info.sensor.source);

    println!("\n🗄  Buffer");
    println!("   ├─ Kind: {}", info.buffer.kind);
    if let Some(ref path) = info.buffer.path {
        println!("   ├─ Path: {}", path);
    }
    if info.buffer.kind == "memory" {
        match info.buffer.capacity {
            Some(capacity) => println!("   ├─ Capacity: {}", capacity),
            None => println!("   ├─ Capacity: unbounded"),
        }
    }
    println!(
        "   └─ Durable: {}",
        if info.buffer.durable { "yes" } else { "no" }
    );

    println!("\n⏱  Cadence");
    println!("   ├─ Writer interval: {}ms", info.writer_interval_ms);
    println!(
        "   ├─ Poller: {} (timeout {}ms)",
        info.poller.format, info.poller.timeout_ms
    );
    println!(
        "   ├─ Poll interval: {}ms (retry after {}ms)",
        info.schedule.interval_ms, info.schedule.retry_delay_ms
    );
    match info.schedule.checkpoint_path {
        Some(ref path) => println!("   └─ Checkpoint: {}", path),
        None => println!("   └─ Checkpoint: (in memory only)"),
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_loader::{ConfigFormat, ConfigLoader};

    #[test]
    fn test_info_json_shape() {
        let blueprint = ConfigLoader::load_from_str(
            r#"
[sensor]
kind = "device"
port = "/dev/ttyUSB0"

[buffer]
kind = "file"
path = "sensor_data.csv"

[schedule]
interval_ms = 10000
checkpoint_path = "watermark.json"
"#,
            ConfigFormat::Toml,
        )
        .unwrap();

        let value = serde_json::to_value(build_config_info(&blueprint)).unwrap();

        assert_eq!(value["sensor"]["kind"], "device");
        assert_eq!(value["sensor"]["source"], "/dev/ttyUSB0");
        assert_eq!(value["sensor"]["baud_rate"], 9600);
        assert!(value["sensor"].get("lines_per_fetch").is_none());
        assert_eq!(value["buffer"]["durable"], true);
        assert_eq!(value["poller"]["format"], "gps_sentence");
        assert_eq!(value["schedule"]["checkpoint_path"], "watermark.json");
    }
}
