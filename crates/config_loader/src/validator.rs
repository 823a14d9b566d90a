//! 配置校验模块
//!
//! 校验规则：
//! - writer / schedule 间隔 > 0
//! - poll 超时 > 0
//! - 传感器参数合法 (port 非空, baud_rate > 0, lines_per_fetch > 0)
//! - buffer 参数合法 (path 非空, capacity > 0)

use contracts::{BufferConfig, ContractError, SensorConfig, StationBlueprint};

/// 校验 StationBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &StationBlueprint) -> Result<(), ContractError> {
    validate_sensor(&blueprint.sensor)?;
    validate_buffer(&blueprint.buffer)?;
    validate_timings(blueprint)?;
    Ok(())
}

/// 校验传感器配置
fn validate_sensor(sensor: &SensorConfig) -> Result<(), ContractError> {
    match sensor {
        SensorConfig::Device(device) => {
            if device.port.trim().is_empty() {
                return Err(ContractError::config_validation(
                    "sensor.port",
                    "device port cannot be empty",
                ));
            }
            if device.baud_rate == 0 {
                return Err(ContractError::config_validation(
                    "sensor.baud_rate",
                    "baud_rate must be > 0",
                ));
            }
            if device.read_timeout_ms == 0 {
                return Err(ContractError::config_validation(
                    "sensor.read_timeout_ms",
                    "read_timeout_ms must be > 0",
                ));
            }
        }
        SensorConfig::Replay(replay) => {
            if replay.path.as_os_str().is_empty() {
                return Err(ContractError::config_validation(
                    "sensor.path",
                    "replay path cannot be empty",
                ));
            }
            if replay.lines_per_fetch == 0 {
                return Err(ContractError::config_validation(
                    "sensor.lines_per_fetch",
                    "lines_per_fetch must be > 0",
                ));
            }
        }
        SensorConfig::Synthetic(_) => {}
    }
    Ok(())
}

/// 校验 buffer 配置
fn validate_buffer(buffer: &BufferConfig) -> Result<(), ContractError> {
    match buffer {
        BufferConfig::File(file) => {
            if file.path.as_os_str().is_empty() {
                return Err(ContractError::config_validation(
                    "buffer.path",
                    "buffer path cannot be empty",
                ));
            }
        }
        BufferConfig::Memory(memory) => {
            if memory.capacity == Some(0) {
                return Err(ContractError::config_validation(
                    "buffer.capacity",
                    "capacity must be > 0 when set",
                ));
            }
        }
    }
    Ok(())
}

/// 校验间隔与超时
fn validate_timings(blueprint: &StationBlueprint) -> Result<(), ContractError> {
    let checks = [
        ("writer.interval_ms", blueprint.writer.interval_ms),
        ("poller.timeout_ms", blueprint.poller.timeout_ms),
        ("schedule.interval_ms", blueprint.schedule.interval_ms),
    ];

    for (field, value) in checks {
        if value == 0 {
            return Err(ContractError::config_validation(
                field,
                format!("{field} must be > 0, got {value}"),
            ));
        }
    }
    Ok(())
}
