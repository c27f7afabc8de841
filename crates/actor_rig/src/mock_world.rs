//! Mock world client
//!
//! Implements the world service and navigation collaborator traits without
//! a simulator. Sensor streams are scripted: every `advance_tick` emits one
//! observation per listening sensor, stamped with the shared tick counter,
//! which matches the lockstep delivery of a synchronous simulation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use contracts::{
    ActorId, ContractError, ControlCommand, Location, NavigationAgent, ObservationCallback,
    ObservationPayload, SensorId, SensorModality, SensorObservation, SensorStream, Transform,
    VehicleControlHandler, TRAFFIC_LIGHT_TAG,
};
use tracing::{debug, trace};

/// Lidar point record matching the simulator's packed layout.
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct PointRecord {
    x: f32,
    y: f32,
    z: f32,
    intensity: f32,
}

/// A scripted traffic light painted into the mock camera frames.
#[derive(Debug, Clone, Copy)]
pub struct MockTrafficLight {
    pub x: u32,
    pub y: u32,
    pub size: u32,
    /// Lamp color, RGB
    pub color: [u8; 3],
}

/// Mock world configuration
#[derive(Debug, Clone)]
pub struct MockWorldConfig {
    /// Camera frame width
    pub image_width: u32,
    /// Camera frame height
    pub image_height: u32,
    /// Lidar points per observation
    pub lidar_points: u32,
    /// Optional scripted traffic light
    pub traffic_light: Option<MockTrafficLight>,
    /// Blueprints whose spawn calls fail (failure injection)
    pub fail_blueprints: Vec<String>,
}

impl Default for MockWorldConfig {
    fn default() -> Self {
        Self {
            image_width: 128,
            image_height: 96,
            lidar_points: 64,
            traffic_light: None,
            fail_blueprints: Vec::new(),
        }
    }
}

struct MockActor {
    blueprint: String,
    #[allow(dead_code)] // recorded for parity with the real attachment graph
    parent: Option<ActorId>,
}

struct StreamState {
    sensor_id: SensorId,
    modality: SensorModality,
    listening: AtomicBool,
    callback: Mutex<Option<ObservationCallback>>,
}

struct MockWorldInner {
    config: MockWorldConfig,
    connected: AtomicBool,
    next_actor_id: AtomicU32,
    frame: AtomicU64,
    actors: Mutex<HashMap<ActorId, MockActor>>,
    streams: Mutex<HashMap<ActorId, Arc<StreamState>>>,
    last_control: Mutex<Option<(ActorId, ControlCommand)>>,
}

/// Mock world client
///
/// Cheap to clone; all clones share the same world state.
#[derive(Clone)]
pub struct MockWorldClient {
    inner: Arc<MockWorldInner>,
}

impl MockWorldClient {
    /// Create with default configuration
    pub fn new() -> Self {
        Self::with_config(MockWorldConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: MockWorldConfig) -> Self {
        Self {
            inner: Arc::new(MockWorldInner {
                config,
                connected: AtomicBool::new(false),
                next_actor_id: AtomicU32::new(1),
                frame: AtomicU64::new(0),
                actors: Mutex::new(HashMap::new()),
                streams: Mutex::new(HashMap::new()),
                last_control: Mutex::new(None),
            }),
        }
    }

    /// Current tick counter
    pub fn current_frame(&self) -> u64 {
        self.inner.frame.load(Ordering::SeqCst)
    }

    /// Last applied control command
    pub fn last_control(&self) -> Option<(ActorId, ControlCommand)> {
        *self.inner.last_control.lock().unwrap()
    }

    fn ensure_connected(&self) -> Result<(), ContractError> {
        if self.inner.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ContractError::WorldConnection {
                message: "not connected".into(),
            })
        }
    }

    fn allocate_actor(&self, blueprint: &str, parent: Option<ActorId>) -> ActorId {
        let actor_id = self.inner.next_actor_id.fetch_add(1, Ordering::SeqCst);
        self.inner.actors.lock().unwrap().insert(
            actor_id,
            MockActor {
                blueprint: blueprint.to_string(),
                parent,
            },
        );
        actor_id
    }

    fn payload_for(&self, modality: SensorModality) -> ObservationPayload {
        let config = &self.inner.config;
        match modality {
            SensorModality::CameraRgb => ObservationPayload::Image {
                width: config.image_width,
                height: config.image_height,
                data: Bytes::from(render_rgb(config)),
            },
            SensorModality::CameraSemanticSeg => ObservationPayload::Image {
                width: config.image_width,
                height: config.image_height,
                data: Bytes::from(render_segmentation(config)),
            },
            SensorModality::Lidar => {
                let points: Vec<PointRecord> = (0..config.lidar_points)
                    .map(|i| PointRecord {
                        x: i as f32 * 0.1,
                        y: -(i as f32) * 0.1,
                        z: 0.5,
                        intensity: 1.0,
                    })
                    .collect();
                ObservationPayload::PointCloud {
                    num_points: config.lidar_points,
                    data: Bytes::copy_from_slice(bytemuck::cast_slice(&points)),
                }
            }
            SensorModality::Other => ObservationPayload::Raw(Bytes::from_static(b"mock")),
        }
    }
}

impl Default for MockWorldClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Gray BGRA frame with the scripted light painted in lamp color.
fn render_rgb(config: &MockWorldConfig) -> Vec<u8> {
    let mut data = vec![128u8; (config.image_width * config.image_height * 4) as usize];
    for chunk in data.chunks_exact_mut(4) {
        chunk[3] = 255;
    }
    if let Some(light) = config.traffic_light {
        let [r, g, b] = light.color;
        paint_patch(&mut data, config, light, [b, g, r, 255]);
    }
    data
}

/// BGRA frame with the semantic tag in the R channel; background unlabeled.
fn render_segmentation(config: &MockWorldConfig) -> Vec<u8> {
    let mut data = vec![0u8; (config.image_width * config.image_height * 4) as usize];
    for chunk in data.chunks_exact_mut(4) {
        chunk[3] = 255;
    }
    if let Some(light) = config.traffic_light {
        paint_patch(&mut data, config, light, [0, 0, TRAFFIC_LIGHT_TAG, 255]);
    }
    data
}

fn paint_patch(data: &mut [u8], config: &MockWorldConfig, light: MockTrafficLight, bgra: [u8; 4]) {
    let x_end = (light.x + light.size).min(config.image_width);
    let y_end = (light.y + light.size).min(config.image_height);
    for y in light.y..y_end {
        for x in light.x..x_end {
            let idx = ((y * config.image_width + x) * 4) as usize;
            data[idx..idx + 4].copy_from_slice(&bgra);
        }
    }
}

impl contracts::WorldClient for MockWorldClient {
    async fn connect(&mut self, host: &str, port: u16) -> Result<(), ContractError> {
        debug!(host, port, "mock world connected");
        self.inner.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn spawn_vehicle(
        &self,
        blueprint: &str,
        _at: Option<Transform>,
    ) -> Result<ActorId, ContractError> {
        self.ensure_connected()?;
        if self.inner.config.fail_blueprints.iter().any(|b| b == blueprint) {
            return Err(ContractError::vehicle_spawn(blueprint, "injected failure"));
        }
        Ok(self.allocate_actor(blueprint, None))
    }

    async fn spawn_sensor(
        &self,
        blueprint: &str,
        _transform: Transform,
        parent_id: ActorId,
        _attributes: &HashMap<String, String>,
    ) -> Result<ActorId, ContractError> {
        self.ensure_connected()?;
        if self.inner.config.fail_blueprints.iter().any(|b| b == blueprint) {
            return Err(ContractError::sensor_spawn(blueprint, "injected failure"));
        }
        if !self.inner.actors.lock().unwrap().contains_key(&parent_id) {
            return Err(ContractError::ActorNotFound { actor_id: parent_id });
        }
        Ok(self.allocate_actor(blueprint, Some(parent_id)))
    }

    async fn destroy_actor(&self, actor_id: ActorId) -> Result<(), ContractError> {
        self.inner.actors.lock().unwrap().remove(&actor_id);
        self.inner.streams.lock().unwrap().remove(&actor_id);
        Ok(())
    }

    async fn actor_exists(&self, actor_id: ActorId) -> Result<bool, ContractError> {
        Ok(self.inner.actors.lock().unwrap().contains_key(&actor_id))
    }

    async fn vehicle_type_id(&self, actor_id: ActorId) -> Result<String, ContractError> {
        self.inner
            .actors
            .lock()
            .unwrap()
            .get(&actor_id)
            .map(|a| a.blueprint.clone())
            .ok_or(ContractError::ActorNotFound { actor_id })
    }

    async fn advance_tick(&self) -> Result<u64, ContractError> {
        self.ensure_connected()?;
        let frame_id = self.inner.frame.fetch_add(1, Ordering::SeqCst) + 1;

        let streams: Vec<Arc<StreamState>> =
            self.inner.streams.lock().unwrap().values().cloned().collect();

        for state in streams {
            if !state.listening.load(Ordering::SeqCst) {
                continue;
            }
            let callback = state.callback.lock().unwrap().clone();
            if let Some(callback) = callback {
                let observation = SensorObservation {
                    sensor_id: state.sensor_id.clone(),
                    modality: state.modality,
                    frame_id,
                    payload: self.payload_for(state.modality),
                };
                trace!(sensor_id = %state.sensor_id, frame_id, "mock observation delivered");
                callback(observation);
            }
        }

        Ok(frame_id)
    }

    fn sensor_stream(
        &self,
        actor_id: ActorId,
        sensor_id: SensorId,
        modality: SensorModality,
    ) -> Option<Box<dyn SensorStream>> {
        if !self.inner.actors.lock().unwrap().contains_key(&actor_id) {
            return None;
        }

        let state = Arc::new(StreamState {
            sensor_id,
            modality,
            listening: AtomicBool::new(false),
            callback: Mutex::new(None),
        });
        self.inner
            .streams
            .lock()
            .unwrap()
            .insert(actor_id, state.clone());

        Some(Box::new(MockSensorStream { state }))
    }
}

impl VehicleControlHandler for MockWorldClient {
    fn apply_vehicle_control(
        &self,
        vehicle_id: ActorId,
        command: ControlCommand,
    ) -> Result<(), ContractError> {
        if !self.inner.actors.lock().unwrap().contains_key(&vehicle_id) {
            return Err(ContractError::ActorNotFound {
                actor_id: vehicle_id,
            });
        }
        *self.inner.last_control.lock().unwrap() = Some((vehicle_id, command));
        Ok(())
    }
}

/// Scripted sensor stream
struct MockSensorStream {
    state: Arc<StreamState>,
}

impl SensorStream for MockSensorStream {
    fn sensor_id(&self) -> &str {
        &self.state.sensor_id
    }

    fn modality(&self) -> SensorModality {
        self.state.modality
    }

    fn listen(&self, callback: ObservationCallback) {
        // Idempotent: a live callback is never replaced.
        if self.state.listening.swap(true, Ordering::SeqCst) {
            return;
        }
        *self.state.callback.lock().unwrap() = Some(callback);
    }

    fn stop(&self) {
        self.state.listening.store(false, Ordering::SeqCst);
        self.state.callback.lock().unwrap().take();
    }

    fn is_listening(&self) -> bool {
        self.state.listening.load(Ordering::SeqCst)
    }
}

/// Mock navigation agent
///
/// Produces a constant cruise command and counts invocations so tests can
/// assert the joined-worker discipline.
#[derive(Debug, Default)]
pub struct MockNavigationAgent {
    computed: AtomicU64,
}

impl MockNavigationAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed computations
    pub fn computed_count(&self) -> u64 {
        self.computed.load(Ordering::SeqCst)
    }
}

impl NavigationAgent for MockNavigationAgent {
    fn compute_control_command(
        &self,
        _vehicle_id: ActorId,
        destination: Location,
        _min_waypoint_horizon: usize,
    ) -> Result<ControlCommand, ContractError> {
        self.computed.fetch_add(1, Ordering::SeqCst);
        Ok(ControlCommand {
            throttle: 0.5,
            steer: destination.y.signum() * 0.1,
            ..Default::default()
        })
    }
}
