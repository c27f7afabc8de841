//! Configuration validation
//!
//! Field-level checks come from the `Validate` derives on the blueprint
//! structs; cross-field rules live here.

use std::collections::HashSet;

use contracts::{ContractError, HarvestBlueprint, SensorModality};
use validator::Validate;

/// Validate a parsed blueprint.
///
/// # Errors
/// Returns `ConfigValidation` naming the offending field.
pub fn validate(blueprint: &HarvestBlueprint) -> Result<(), ContractError> {
    blueprint.validate().map_err(|e| {
        let field = e
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        ContractError::config_validation(field, e.to_string())
    })?;

    validate_sensor_ids(blueprint)?;
    validate_camera_pairing(blueprint)?;

    Ok(())
}

/// Sensor ids must be unique; the synchronizer keys its queues by id.
fn validate_sensor_ids(blueprint: &HarvestBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for sensor in &blueprint.vehicle.sensors {
        if !seen.insert(sensor.id.as_str()) {
            return Err(ContractError::config_validation(
                "vehicle.sensors.id",
                format!("duplicate sensor id '{}'", sensor.id),
            ));
        }
    }
    Ok(())
}

/// A segmentation camera without an RGB partner (or vice versa) can never
/// produce a labeled pair; reject the configuration up front.
fn validate_camera_pairing(blueprint: &HarvestBlueprint) -> Result<(), ContractError> {
    let has_rgb = blueprint
        .first_sensor_of_modality(SensorModality::CameraRgb)
        .is_some();
    let has_seg = blueprint
        .first_sensor_of_modality(SensorModality::CameraSemanticSeg)
        .is_some();

    if has_rgb != has_seg {
        return Err(ContractError::config_validation(
            "vehicle.sensors",
            "rgb and segmentation cameras must be configured together",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_toml;

    fn base_config(sensors: &str) -> String {
        format!(
            r#"
[world]
host = "localhost"

[vehicle]
id = "ego"
blueprint = "vehicle.tesla.cybertruck"
{sensors}
"#
        )
    }

    #[test]
    fn accepts_paired_cameras() {
        let content = base_config(
            r#"
[[vehicle.sensors]]
id = "front_rgb"
modality = "camera_rgb"

[[vehicle.sensors]]
id = "front_seg"
modality = "camera_semantic_seg"
"#,
        );
        let bp = parse_toml(&content).unwrap();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn rejects_duplicate_sensor_ids() {
        let content = base_config(
            r#"
[[vehicle.sensors]]
id = "front_rgb"
modality = "camera_rgb"

[[vehicle.sensors]]
id = "front_rgb"
modality = "camera_semantic_seg"
"#,
        );
        let bp = parse_toml(&content).unwrap();
        let err = validate(&bp).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }

    #[test]
    fn rejects_unpaired_segmentation_camera() {
        let content = base_config(
            r#"
[[vehicle.sensors]]
id = "front_seg"
modality = "camera_semantic_seg"
"#,
        );
        let bp = parse_toml(&content).unwrap();
        let err = validate(&bp).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }

    #[test]
    fn rejects_empty_vehicle_id() {
        let content = r#"
[world]
host = "localhost"

[vehicle]
id = ""
blueprint = "vehicle.tesla.cybertruck"
"#;
        let bp = parse_toml(content).unwrap();
        let err = validate(&bp).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }
}
