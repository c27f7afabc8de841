//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use contracts::{ContractError, HarvestBlueprint};

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
pub fn parse_toml(content: &str) -> Result<HarvestBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<HarvestBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<HarvestBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SensorModality;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[world]
host = "localhost"
port = 2000

[vehicle]
id = "ego"
blueprint = "vehicle.tesla.cybertruck"

[[vehicle.sensors]]
id = "front_rgb"
modality = "camera_rgb"
[vehicle.sensors.transform.location]
x = 2.0
y = 0.0
z = 1.5
[vehicle.sensors.transform.rotation]
pitch = 0.0
yaw = 0.0
roll = 0.0

[[vehicle.sensors]]
id = "front_seg"
modality = "camera_semantic_seg"

[capture]
raw_data_root = "./raw_data"
sync_timeout_sec = 1.0
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.vehicle.id, "ego");
        assert_eq!(bp.vehicle.sensors.len(), 2);
        assert_eq!(bp.vehicle.sensors[0].modality, SensorModality::CameraRgb);
        assert_eq!(bp.capture.sync_timeout_sec, 1.0);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "world": { "host": "localhost", "port": 2000 },
            "vehicle": {
                "id": "ego",
                "blueprint": "vehicle.tesla.cybertruck",
                "sensors": [{
                    "id": "roof_lidar",
                    "modality": "lidar"
                }]
            }
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.vehicle.sensors[0].modality, SensorModality::Lidar);
        // defaults kick in for omitted sections
        assert_eq!(bp.capture.queue_capacity, 100);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("JSON"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }

    #[test]
    fn test_parse_error_reported() {
        let result = parse_toml("vehicle = ");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }
}
