//! FrameBundle - synchronizer output
//!
//! One time-aligned set of observations, keyed by sensor.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{SensorId, SensorObservation};

/// A synchronized set of observations for one logical frame.
///
/// Only ever constructed complete: every attached sensor contributed an
/// observation with `frame_id >= target_frame_id`, or the round failed and
/// no bundle exists. Built and discarded once per synchronization round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameBundle {
    /// Frame id the round was synchronized to
    pub target_frame_id: u64,

    /// Observations per sensor
    pub observations: HashMap<SensorId, SensorObservation>,
}

impl FrameBundle {
    /// Create an empty bundle for the given target.
    pub fn new(target_frame_id: u64) -> Self {
        Self {
            target_frame_id,
            observations: HashMap::new(),
        }
    }

    /// Insert a qualifying observation.
    pub fn insert(&mut self, observation: SensorObservation) {
        self.observations
            .insert(observation.sensor_id.clone(), observation);
    }

    /// Observation for a given sensor, if present.
    pub fn get(&self, sensor_id: &str) -> Option<&SensorObservation> {
        self.observations.get(sensor_id)
    }

    /// Number of contributing sensors.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObservationPayload, SensorModality};
    use bytes::Bytes;

    #[test]
    fn insert_and_get() {
        let mut bundle = FrameBundle::new(9);
        bundle.insert(SensorObservation {
            sensor_id: "front_rgb".into(),
            modality: SensorModality::CameraRgb,
            frame_id: 9,
            payload: ObservationPayload::Raw(Bytes::new()),
        });

        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.get("front_rgb").unwrap().frame_id, 9);
        assert!(bundle.get("roof_lidar").is_none());
    }
}
