//! CaptureCoordinator - per-sensor queue registration
//!
//! Owns one bounded queue per attached sensor. The simulator's delivery
//! threads push through a callback holding a weak back-reference to the
//! coordinator state; pushing into the queue is the sole cross-thread
//! mutation point.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_channel::{bounded, Receiver, Sender, TrySendError};
use contracts::{
    ActorId, ObservationCallback, SensorDescriptor, SensorId, SensorModality, SensorObservation,
    SensorStream, WorldClient,
};
use tracing::{debug, instrument, trace, warn};

use crate::error::{CaptureError, Result};
use crate::metrics::{CaptureMetrics, MetricsSnapshot};
use crate::synchronizer::FrameSynchronizer;

/// Shared coordinator state referenced weakly from delivery callbacks.
///
/// A callback that outlives its coordinator (pending delivery after
/// teardown) upgrades the weak reference, fails, and returns; pending
/// callbacks never keep a capture session alive.
struct CoordinatorShared {
    accepting: AtomicBool,
    metrics: CaptureMetrics,
}

/// Handle for one attached sensor.
pub struct SensorHandle {
    pub sensor_id: SensorId,
    pub actor_id: ActorId,
    pub modality: SensorModality,
    stream: Box<dyn SensorStream>,
}

impl SensorHandle {
    /// Stop the underlying delivery stream.
    pub fn stop(&self) {
        self.stream.stop();
    }

    /// Whether the stream is still delivering.
    pub fn is_listening(&self) -> bool {
        self.stream.is_listening()
    }
}

/// Capture coordinator
///
/// `attach` spawns a sensor through the world service, registers its
/// dedicated queue and subscribes the delivery stream. Each queue has a
/// single producer (that sensor's callback) and a single consumer (the
/// synchronizer loop).
pub struct CaptureCoordinator {
    shared: Arc<CoordinatorShared>,
    capture_dir: PathBuf,
    queue_capacity: usize,
    receivers: Vec<(SensorId, Receiver<SensorObservation>)>,
    handles: HashMap<SensorId, SensorHandle>,
}

impl CaptureCoordinator {
    /// Create a coordinator persisting under `capture_dir`.
    pub fn new(capture_dir: PathBuf, queue_capacity: usize) -> Self {
        Self {
            shared: Arc::new(CoordinatorShared {
                accepting: AtomicBool::new(true),
                metrics: CaptureMetrics::new(),
            }),
            capture_dir,
            queue_capacity,
            receivers: Vec::new(),
            handles: HashMap::new(),
        }
    }

    /// Spawn a sensor and register its queue.
    ///
    /// Creates the sensor's persistence directory lazily, once, before any
    /// observation can arrive. A failure here is fatal for this sensor only
    /// and is surfaced to the caller; no queue is registered.
    #[instrument(
        name = "coordinator_attach",
        skip(self, world, descriptor),
        fields(sensor_id = %descriptor.sensor_id, modality = ?descriptor.modality)
    )]
    pub async fn attach<C: WorldClient>(
        &mut self,
        world: &C,
        descriptor: &SensorDescriptor,
        parent_id: ActorId,
    ) -> Result<ActorId> {
        let sensor_id = descriptor.sensor_id.clone();

        self.ensure_sensor_dir(descriptor.modality)?;

        let actor_id = world
            .spawn_sensor(
                descriptor.modality.blueprint_id(),
                descriptor.transform,
                parent_id,
                &descriptor.attributes,
            )
            .await
            .map_err(|e| CaptureError::attach(sensor_id.as_str(), e.to_string()))?;

        let stream = world
            .sensor_stream(actor_id, sensor_id.clone(), descriptor.modality)
            .ok_or_else(|| {
                CaptureError::attach(sensor_id.as_str(), "world returned no delivery stream")
            })?;

        let (tx, rx) = bounded(self.queue_capacity);
        stream.listen(Self::make_callback(&self.shared, sensor_id.clone(), tx));

        debug!(actor_id, "sensor attached, queue registered");

        self.receivers.push((sensor_id.clone(), rx));
        self.handles.insert(
            sensor_id.clone(),
            SensorHandle {
                sensor_id,
                actor_id,
                modality: descriptor.modality,
                stream,
            },
        );

        Ok(actor_id)
    }

    /// Build the delivery callback for one sensor.
    ///
    /// The callback owns a clone of the queue sender and a weak reference to
    /// the coordinator state; it is safe under arbitrary concurrent
    /// invocation because the sender is the only thing it mutates through.
    fn make_callback(
        shared: &Arc<CoordinatorShared>,
        sensor_id: SensorId,
        tx: Sender<SensorObservation>,
    ) -> ObservationCallback {
        let weak: Weak<CoordinatorShared> = Arc::downgrade(shared);

        Arc::new(move |observation| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            if !shared.accepting.load(Ordering::Relaxed) {
                return;
            }

            shared.metrics.record_received();
            metrics::counter!(
                "datagen_observations_received_total",
                "sensor_id" => sensor_id.to_string()
            )
            .increment(1);

            match tx.try_send(observation) {
                Ok(()) => {
                    trace!(sensor_id = %sensor_id, "observation enqueued");
                }
                Err(TrySendError::Full(_)) => {
                    shared.metrics.record_dropped();
                    metrics::counter!(
                        "datagen_observations_dropped_total",
                        "sensor_id" => sensor_id.to_string()
                    )
                    .increment(1);
                    trace!(sensor_id = %sensor_id, "observation dropped (queue full)");
                }
                Err(TrySendError::Closed(_)) => {
                    warn!(sensor_id = %sensor_id, "observation queue closed");
                }
            }
        })
    }

    /// Persistence directory for a sensor, created once at attach time.
    fn ensure_sensor_dir(&self, modality: SensorModality) -> Result<()> {
        let dir = match modality {
            SensorModality::CameraSemanticSeg => self.capture_dir.join("seg"),
            _ => self.capture_dir.clone(),
        };
        std::fs::create_dir_all(&dir)?;
        Ok(())
    }

    /// Synchronizer over all registered queues.
    ///
    /// The synchronizer is the single consumer of every queue; build one per
    /// capture loop.
    pub fn synchronizer(&self, timeout: Duration) -> FrameSynchronizer {
        FrameSynchronizer::new(self.receivers.clone(), timeout)
    }

    /// Attached sensor count.
    pub fn sensor_count(&self) -> usize {
        self.handles.len()
    }

    /// Actor ids of all attached sensors (for rig teardown).
    pub fn sensor_actor_ids(&self) -> Vec<(SensorId, ActorId)> {
        self.handles
            .values()
            .map(|h| (h.sensor_id.clone(), h.actor_id))
            .collect()
    }

    /// Handle for a given sensor.
    pub fn handle(&self, sensor_id: &str) -> Option<&SensorHandle> {
        self.handles.get(sensor_id)
    }

    /// Capture metrics snapshot.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Stop accepting observations and unsubscribe every stream.
    ///
    /// Queues drain naturally: senders are dropped with the handles'
    /// callbacks, so the consumer observes `Closed` instead of blocking
    /// forever on a quiet sensor.
    #[instrument(name = "coordinator_shutdown", skip(self))]
    pub fn shutdown(&mut self) {
        self.shared.accepting.store(false, Ordering::SeqCst);
        for handle in self.handles.values() {
            debug!(sensor_id = %handle.sensor_id, "stopping sensor stream");
            handle.stop();
        }
        self.handles.clear();
        self.receivers.clear();
    }
}

impl Drop for CaptureCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
