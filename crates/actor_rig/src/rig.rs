//! ActorRig - vehicle lifecycle against the world service
//!
//! Spawns the capture vehicle, tracks every created actor, and tears the
//! rig down idempotently (sensors before the vehicle that carries them).

use std::collections::HashMap;

use contracts::{
    ActorId, SensorConfig, SensorDescriptor, SensorModality, VehicleConfig, WorldClient,
};
use tracing::{error, info, instrument};

use crate::error::{Result, RigError};

/// Runtime actor graph
///
/// Records every spawned actor so teardown never depends on which attach
/// steps succeeded.
#[derive(Debug, Clone, Default)]
pub struct RigGraph {
    /// Vehicle config id -> actor handle
    pub vehicles: HashMap<String, ActorId>,

    /// Sensor config id -> actor handle
    pub sensors: HashMap<String, ActorId>,
}

impl RigGraph {
    /// Create empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Register vehicle
    pub fn register_vehicle(&mut self, id: String, actor_id: ActorId) {
        self.vehicles.insert(id, actor_id);
    }

    /// Register sensor
    pub fn register_sensor(&mut self, sensor_id: String, actor_id: ActorId) {
        self.sensors.insert(sensor_id, actor_id);
    }
}

/// Actor rig
pub struct ActorRig<C: WorldClient> {
    client: C,
}

impl<C: WorldClient> ActorRig<C> {
    /// Create a new rig over a connected client.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// World client reference.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Spawn the capture vehicle.
    #[instrument(
        name = "rig_spawn_vehicle",
        skip(self, config),
        fields(vehicle_id = %config.id, blueprint = %config.blueprint)
    )]
    pub async fn spawn_vehicle(&self, config: &VehicleConfig) -> Result<ActorId> {
        info!("spawning vehicle");
        let actor_id = self
            .client
            .spawn_vehicle(&config.blueprint, config.spawn_point)
            .await
            .map_err(|e| RigError::vehicle_spawn(&config.id, e.to_string()))?;

        info!(actor_id, "vehicle spawned successfully");
        Ok(actor_id)
    }

    /// Destroy every actor in the graph.
    ///
    /// # Idempotency
    /// Safe to call repeatedly; unknown actors are ignored by the world
    /// service and destroy errors are logged, never propagated.
    #[instrument(
        name = "rig_teardown",
        skip(self, graph),
        fields(vehicles = graph.vehicles.len(), sensors = graph.sensors.len())
    )]
    pub async fn teardown(&self, graph: &RigGraph) {
        info!("starting teardown");

        // Sensors first: a destroyed vehicle takes its attachments with it
        // and the delivery streams would report spurious errors.
        for (sensor_id, actor_id) in &graph.sensors {
            self.destroy_actor_safe(*actor_id, sensor_id).await;
        }

        for (vehicle_id, actor_id) in &graph.vehicles {
            self.destroy_actor_safe(*actor_id, vehicle_id).await;
        }

        info!("teardown completed");
    }

    async fn destroy_actor_safe(&self, actor_id: ActorId, config_id: &str) {
        info!(actor_id, config_id, "destroying actor");

        if let Err(e) = self.client.destroy_actor(actor_id).await {
            error!(actor_id, config_id, error = %e, "failed to destroy actor");
        }
    }
}

/// Build the full sensor descriptor for a configured sensor.
///
/// Modality defaults are merged first, then the configuration's explicit
/// attributes override them.
pub fn sensor_descriptor(config: &SensorConfig) -> SensorDescriptor {
    let mut attributes = default_sensor_attributes(config.modality);
    attributes.extend(config.attributes.clone());

    SensorDescriptor {
        sensor_id: config.id.as_str().into(),
        modality: config.modality,
        transform: config.transform,
        attributes,
    }
}

/// Blueprint attribute defaults per modality.
fn default_sensor_attributes(modality: SensorModality) -> HashMap<String, String> {
    let mut attributes = HashMap::new();
    match modality {
        SensorModality::CameraRgb | SensorModality::CameraSemanticSeg => {
            attributes.insert("image_size_x".into(), "1382".into());
            attributes.insert("image_size_y".into(), "512".into());
            attributes.insert("fov".into(), "90".into());
            attributes.insert("gamma".into(), "2.2".into());
        }
        SensorModality::Lidar => {
            attributes.insert("range".into(), "100".into());
            attributes.insert("channels".into(), "64".into());
            attributes.insert("points_per_second".into(), "1300000".into());
            attributes.insert("rotation_frequency".into(), "10".into());
            attributes.insert("upper_fov".into(), "2.0".into());
            attributes.insert("lower_fov".into(), "-24.8".into());
            attributes.insert("noise_stddev".into(), "0.02".into());
        }
        SensorModality::Other => {}
    }
    attributes
}
