//! Layered error definitions
//!
//! Categorized by source: config / world / sync / persistence

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== World Service Errors =====
    /// Simulator connection error
    #[error("world connection error: {message}")]
    WorldConnection { message: String },

    /// Sensor spawn failure; fatal for that sensor, capture does not proceed for it
    #[error("sensor spawn error for '{sensor_id}': {message}")]
    SensorSpawn { sensor_id: String, message: String },

    /// Vehicle spawn failure
    #[error("vehicle spawn error for '{vehicle_id}': {message}")]
    VehicleSpawn { vehicle_id: String, message: String },

    /// Actor lookup failure
    #[error("actor not found: {actor_id}")]
    ActorNotFound { actor_id: u32 },

    // ===== Synchronization Errors =====
    /// Bounded wait elapsed before a sensor reached the target frame.
    /// The whole bundle is abandoned; never a partial write.
    #[error("sync timeout: sensor '{sensor_id}' did not reach frame {target_frame_id} within {waited_ms}ms")]
    SyncTimeout {
        sensor_id: String,
        target_frame_id: u64,
        waited_ms: u64,
    },

    /// A sensor queue closed while a round was in progress (teardown)
    #[error("sensor queue closed: {sensor_id}")]
    QueueClosed { sensor_id: String },

    // ===== Persistence Errors =====
    /// Observation modality has no dedicated decode path; the writer falls
    /// back to the generic save and reports this as a warning
    #[error("unsupported modality for sensor '{sensor_id}': {modality}")]
    UnsupportedModality { sensor_id: String, modality: String },

    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Dataset output error
    #[error("dataset write error at '{path}': {message}")]
    DatasetWrite { path: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sensor spawn error
    pub fn sensor_spawn(sensor_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SensorSpawn {
            sensor_id: sensor_id.into(),
            message: message.into(),
        }
    }

    /// Create vehicle spawn error
    pub fn vehicle_spawn(vehicle_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::VehicleSpawn {
            vehicle_id: vehicle_id.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create dataset write error
    pub fn dataset_write(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DatasetWrite {
            path: path.into(),
            message: message.into(),
        }
    }
}
