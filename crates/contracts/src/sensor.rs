//! SensorObservation - capture input
//!
//! Raw sensor reading structures as delivered by the simulator callback.

use std::collections::HashMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::SensorId;

/// Sensor modality tag.
///
/// Decides both the spawn blueprint and the decode path in the frame writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorModality {
    /// RGB camera
    CameraRgb,
    /// Semantic segmentation camera (per-pixel class tags)
    CameraSemanticSeg,
    /// Rotating lidar (x, y, z, intensity point records)
    Lidar,
    /// Anything else; persisted through the generic fallback
    Other,
}

impl SensorModality {
    /// Simulator blueprint id for this modality.
    pub fn blueprint_id(&self) -> &'static str {
        match self {
            SensorModality::CameraRgb => "sensor.camera.rgb",
            SensorModality::CameraSemanticSeg => "sensor.camera.semantic_segmentation",
            SensorModality::Lidar => "sensor.lidar.ray_cast",
            SensorModality::Other => "sensor.other.unknown",
        }
    }

    /// True for both camera variants.
    pub fn is_camera(&self) -> bool {
        matches!(
            self,
            SensorModality::CameraRgb | SensorModality::CameraSemanticSeg
        )
    }
}

/// Static sensor description, fixed at attach time.
///
/// The attribute map carries simulator blueprint attributes
/// (`image_size_x`, `fov`, `range`, `channels`, ...) verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorDescriptor {
    /// Configuration id, unique within a capture session
    pub sensor_id: SensorId,

    /// Modality tag
    pub modality: SensorModality,

    /// Mount pose relative to the parent actor
    pub transform: Transform,

    /// Blueprint attributes
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// One reading from a single sensor.
///
/// Owned exclusively by the per-sensor queue from the moment the delivery
/// callback enqueues it until the synchronizer consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorObservation {
    /// Producing sensor
    pub sensor_id: SensorId,

    /// Modality tag (copied from the descriptor so the writer never needs a lookup)
    pub modality: SensorModality,

    /// Simulation frame counter; non-decreasing per sensor
    pub frame_id: u64,

    /// Raw payload
    pub payload: ObservationPayload,
}

/// Raw observation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ObservationPayload {
    /// Camera image, BGRA byte order as delivered by the simulator
    Image {
        width: u32,
        height: u32,
        data: Bytes,
    },

    /// Lidar point cloud, packed 16-byte (x, y, z, intensity) f32 records
    PointCloud { num_points: u32, data: Bytes },

    /// Opaque bytes (fallback)
    Raw(Bytes),
}

impl ObservationPayload {
    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        match self {
            ObservationPayload::Image { data, .. } => data.len(),
            ObservationPayload::PointCloud { data, .. } => data.len(),
            ObservationPayload::Raw(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 3D transform: location + rotation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Transform {
    /// Location (x, y, z) in meters
    pub location: Location,

    /// Rotation (pitch, yaw, roll) in degrees
    pub rotation: Rotation,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}
