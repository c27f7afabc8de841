//! Capture error types

use contracts::ContractError;
use thiserror::Error;

/// Capture specific error
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Sensor spawn or stream registration failure at attach time
    #[error("failed to attach sensor '{sensor_id}': {message}")]
    Attach { sensor_id: String, message: String },

    /// A synchronization round's bounded wait elapsed
    #[error("sync timeout: sensor '{sensor_id}' did not reach frame {target_frame_id} within {waited_ms}ms")]
    Timeout {
        sensor_id: String,
        target_frame_id: u64,
        waited_ms: u64,
    },

    /// A sensor queue closed mid-round (teardown in progress)
    #[error("sensor queue closed: {sensor_id}")]
    QueueClosed { sensor_id: String },

    /// Frame persistence failure
    #[error("failed to persist frame {frame_id} for sensor '{sensor_id}': {source}")]
    Persist {
        sensor_id: String,
        frame_id: u64,
        #[source]
        source: std::io::Error,
    },

    /// Image encode failure
    #[error("image encode error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error outside a specific frame write
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl CaptureError {
    /// Create attach error
    pub fn attach(sensor_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Attach {
            sensor_id: sensor_id.into(),
            message: message.into(),
        }
    }

    /// True when the error abandons the current frame only; the capture
    /// session itself continues.
    pub fn is_frame_local(&self) -> bool {
        matches!(
            self,
            CaptureError::Timeout { .. } | CaptureError::Persist { .. } | CaptureError::Image(_)
        )
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, CaptureError>;
