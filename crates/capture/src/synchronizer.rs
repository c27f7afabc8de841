//! FrameSynchronizer - align queues to a target frame id
//!
//! Cross-sensor alignment is enforced here and nowhere else; arrival order
//! across sensors carries no guarantee.

use std::time::Duration;

use async_channel::Receiver;
use contracts::{FrameBundle, SensorId, SensorObservation};
use tracing::{instrument, trace, warn};

use crate::error::{CaptureError, Result};

/// Frame synchronizer
///
/// Single consumer over every sensor queue. One `sync_to` call is one
/// synchronization round: each queue is popped past stale entries until it
/// yields an observation at or after the target frame, every pop bounded by
/// the configured timeout.
pub struct FrameSynchronizer {
    queues: Vec<(SensorId, Receiver<SensorObservation>)>,
    timeout: Duration,
}

impl FrameSynchronizer {
    /// Create a synchronizer over the given queues.
    pub fn new(queues: Vec<(SensorId, Receiver<SensorObservation>)>, timeout: Duration) -> Self {
        Self { queues, timeout }
    }

    /// Number of synchronized sensors.
    pub fn sensor_count(&self) -> usize {
        self.queues.len()
    }

    /// Synchronize every sensor to `target_frame_id`.
    ///
    /// Observations with a lower frame id are discarded; the first
    /// observation at or beyond the target joins the bundle. Anything still
    /// queued past the target is left for the next round.
    ///
    /// # Errors
    /// `Timeout` if any sensor fails to reach the target within the bounded
    /// wait; the whole bundle is abandoned and nothing is persisted.
    #[instrument(name = "sync_to", skip(self))]
    pub async fn sync_to(&self, target_frame_id: u64) -> Result<FrameBundle> {
        let mut bundle = FrameBundle::new(target_frame_id);

        for (sensor_id, queue) in &self.queues {
            loop {
                let observation = self.pop_bounded(sensor_id, queue, target_frame_id).await?;

                if observation.frame_id < target_frame_id {
                    trace!(
                        sensor_id = %sensor_id,
                        frame_id = observation.frame_id,
                        "discarding stale observation"
                    );
                    metrics::counter!(
                        "datagen_observations_discarded_total",
                        "sensor_id" => sensor_id.to_string()
                    )
                    .increment(1);
                    continue;
                }

                bundle.insert(observation);
                break;
            }
        }

        metrics::counter!("datagen_sync_rounds_total", "status" => "ok").increment(1);
        Ok(bundle)
    }

    /// One bounded pop from one queue.
    async fn pop_bounded(
        &self,
        sensor_id: &SensorId,
        queue: &Receiver<SensorObservation>,
        target_frame_id: u64,
    ) -> Result<SensorObservation> {
        match tokio::time::timeout(self.timeout, queue.recv()).await {
            Ok(Ok(observation)) => Ok(observation),
            Ok(Err(_)) => Err(CaptureError::QueueClosed {
                sensor_id: sensor_id.to_string(),
            }),
            Err(_) => {
                warn!(
                    sensor_id = %sensor_id,
                    target_frame_id,
                    "synchronization round timed out"
                );
                metrics::counter!("datagen_sync_rounds_total", "status" => "timeout").increment(1);
                Err(CaptureError::Timeout {
                    sensor_id: sensor_id.to_string(),
                    target_frame_id,
                    waited_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }
}
