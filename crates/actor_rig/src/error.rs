//! Actor rig error types

use contracts::{ActorId, ContractError};
use thiserror::Error;

/// Actor rig specific error
#[derive(Debug, Error)]
pub enum RigError {
    /// World connection error
    #[error("failed to connect to world service: {message}")]
    ConnectionFailed { message: String },

    /// Vehicle spawn error
    #[error("failed to spawn vehicle '{vehicle_id}': {message}")]
    VehicleSpawnFailed { vehicle_id: String, message: String },

    /// Control worker join error
    #[error("control worker for vehicle {vehicle_id} failed to join: {message}")]
    ControlJoin { vehicle_id: ActorId, message: String },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl RigError {
    /// Create vehicle spawn error
    pub fn vehicle_spawn(vehicle_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::VehicleSpawnFailed {
            vehicle_id: vehicle_id.into(),
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, RigError>;
