//! World service and navigation collaborator interfaces
//!
//! The simulation world and the navigation agent are external services;
//! the core only ever talks to them through these traits. Real clients
//! live outside this workspace, mock implementations in `actor_rig`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{ContractError, Location, SensorId, SensorModality, SensorObservation, Transform};

/// Simulator actor handle type
pub type ActorId = u32;

/// Observation delivery callback type
///
/// The world service's delivery threads invoke this concurrently and at
/// arbitrary times; implementations must only synchronize through the
/// per-sensor queue they push into.
pub type ObservationCallback = Arc<dyn Fn(SensorObservation) + Send + Sync>;

/// Sensor data source trait
///
/// Abstracts a spawned sensor's delivery mechanism so mock and real sensors
/// are handled uniformly by the capture coordinator.
pub trait SensorStream: Send + Sync {
    /// Sensor configuration id
    fn sensor_id(&self) -> &str;

    /// Modality tag
    fn modality(&self) -> SensorModality;

    /// Register the delivery callback
    ///
    /// Repeated calls are idempotent: a second callback is never registered
    /// while the first is live.
    fn listen(&self, callback: ObservationCallback);

    /// Stop delivery; pending callbacks become no-ops
    fn stop(&self);

    /// Check whether the stream is delivering
    fn is_listening(&self) -> bool;
}

/// World service client trait
///
/// Narrow surface over the external simulation world: actor lifecycle,
/// sensor streams, and the lockstep tick.
pub trait WorldClient: Send + Sync {
    /// Connect to the world service
    fn connect(&mut self, host: &str, port: u16)
        -> impl Future<Output = Result<(), ContractError>> + Send;

    /// Spawn a vehicle
    ///
    /// # Arguments
    /// * `blueprint` - blueprint name, e.g. "vehicle.tesla.cybertruck"
    /// * `at` - spawn pose; `None` picks a free spawn point
    fn spawn_vehicle(
        &self,
        blueprint: &str,
        at: Option<Transform>,
    ) -> impl Future<Output = Result<ActorId, ContractError>> + Send;

    /// Spawn a sensor attached to a parent actor
    fn spawn_sensor(
        &self,
        blueprint: &str,
        transform: Transform,
        parent_id: ActorId,
        attributes: &HashMap<String, String>,
    ) -> impl Future<Output = Result<ActorId, ContractError>> + Send;

    /// Destroy an actor; idempotent, unknown actors are ignored
    fn destroy_actor(&self, actor_id: ActorId)
        -> impl Future<Output = Result<(), ContractError>> + Send;

    /// Check whether an actor exists
    fn actor_exists(&self, actor_id: ActorId)
        -> impl Future<Output = Result<bool, ContractError>> + Send;

    /// Type id of a spawned vehicle (used in the capture directory name)
    fn vehicle_type_id(
        &self,
        actor_id: ActorId,
    ) -> impl Future<Output = Result<String, ContractError>> + Send;

    /// Advance the simulation one tick; returns the new frame id
    fn advance_tick(&self) -> impl Future<Output = Result<u64, ContractError>> + Send;

    /// Delivery stream for a spawned sensor, `None` if the actor is unknown
    fn sensor_stream(
        &self,
        actor_id: ActorId,
        sensor_id: SensorId,
        modality: SensorModality,
    ) -> Option<Box<dyn SensorStream>>;
}

/// Vehicle control command computed by the navigation agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    /// Throttle [0, 1]
    pub throttle: f64,
    /// Steering [-1, 1]
    pub steer: f64,
    /// Brake [0, 1]
    pub brake: f64,
    pub hand_brake: bool,
    pub reverse: bool,
}

/// Navigation agent trait
///
/// `compute_control_command` may take a full planning step; callers run it
/// on a short-lived worker and join the result before applying, so at most
/// one command is ever in flight per vehicle per tick.
pub trait NavigationAgent: Send + Sync {
    fn compute_control_command(
        &self,
        vehicle_id: ActorId,
        destination: Location,
        min_waypoint_horizon: usize,
    ) -> Result<ControlCommand, ContractError>;
}

/// Control application trait, implemented by the world side.
pub trait VehicleControlHandler: Send + Sync {
    fn apply_vehicle_control(
        &self,
        vehicle_id: ActorId,
        command: ControlCommand,
    ) -> Result<(), ContractError>;
}
