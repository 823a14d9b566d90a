//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use contracts::{ContractError, StationBlueprint};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<StationBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<StationBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<StationBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BufferConfig, LineFormat, SensorConfig, SyntheticShape};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[sensor]
kind = "replay"
path = "sample-data.csv"

[buffer]
kind = "file"
path = "/tmp/sensor_data.csv"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert!(matches!(bp.sensor, SensorConfig::Replay(_)));
        assert!(matches!(bp.buffer, BufferConfig::File(_)));
        assert_eq!(bp.writer.interval_ms, 10_000);
        assert_eq!(bp.poller.format, LineFormat::GpsSentence);
        assert!(bp.schedule.checkpoint_path.is_none());
    }

    #[test]
    fn test_parse_toml_full() {
        let content = r#"
[sensor]
kind = "synthetic"
shape = "gps_sentence"
seed = 7

[buffer]
kind = "memory"
capacity = 512

[writer]
interval_ms = 250

[poller]
format = "gps_sentence"
timeout_ms = 3000

[schedule]
interval_ms = 500
retry_delay_ms = 100
checkpoint_path = "watermark.json"
"#;
        let bp = parse_toml(content).unwrap();
        let SensorConfig::Synthetic(synthetic) = &bp.sensor else {
            panic!("expected synthetic sensor");
        };
        assert_eq!(synthetic.shape, SyntheticShape::GpsSentence);
        assert_eq!(synthetic.seed, Some(7));
        let BufferConfig::Memory(memory) = &bp.buffer else {
            panic!("expected memory buffer");
        };
        assert_eq!(memory.capacity, Some(512));
        assert_eq!(bp.writer.interval_ms, 250);
        assert_eq!(bp.poller.timeout_ms, 3000);
        assert_eq!(bp.schedule.retry_delay_ms, 100);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "sensor": { "kind": "device", "port": "/dev/ttyUSB0", "baud_rate": 115200 },
            "buffer": { "kind": "memory" },
            "poller": { "format": "climate_csv" }
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.poller.format, LineFormat::ClimateCsv);
    }

    #[test]
    fn test_parse_toml_unknown_sensor_kind() {
        let content = r#"
[sensor]
kind = "carrier_pigeon"

[buffer]
kind = "memory"
"#;
        let err = parse_toml(content).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
