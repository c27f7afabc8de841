//! Pipeline orchestrator - coordinates rig, coordinator and writer.
//!
//! Runs against the mock world client; a real simulator client plugs in
//! through the same `WorldClient` trait without touching this loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actor_rig::{
    sensor_descriptor, ActorRig, ControlPilot, MockNavigationAgent, MockTrafficLight,
    MockWorldClient, MockWorldConfig, RigGraph,
};
use anyhow::{Context, Result};
use capture::{capture_directory, session_stamp, CaptureCoordinator, CaptureError, FrameWriter};
use contracts::{HarvestBlueprint, WorldClient};
use observability::CaptureAggregator;
use tracing::{error, info, warn};

use super::CaptureStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The capture blueprint
    pub blueprint: HarvestBlueprint,

    /// Number of frames to capture
    pub frames: u64,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main capture pipeline
pub struct CapturePipeline {
    config: PipelineConfig,
}

impl CapturePipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<CaptureStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        info!(
            host = %blueprint.world.host,
            port = blueprint.world.port,
            "Connecting to world service (mock)..."
        );

        let mut client = MockWorldClient::with_config(mock_world_config());
        client
            .connect(&blueprint.world.host, blueprint.world.port)
            .await
            .context("Failed to connect to world service")?;

        info!("World client initialized");

        // Spawn the capture vehicle
        let rig = ActorRig::new(client.clone());
        let mut graph = RigGraph::new();

        let vehicle_actor = rig
            .spawn_vehicle(&blueprint.vehicle)
            .await
            .context("Failed to spawn capture vehicle")?;
        graph.register_vehicle(blueprint.vehicle.id.clone(), vehicle_actor);

        let vehicle_type = client.vehicle_type_id(vehicle_actor).await?;

        // Capture layout for this session
        let session = session_stamp(chrono::Local::now());
        let capture_dir = capture_directory(
            &blueprint.capture.raw_data_root,
            &session,
            &vehicle_type,
            vehicle_actor,
        );
        info!(capture_dir = %capture_dir.display(), "Capture session directory");

        // Attach sensors; a spawn failure is fatal for that sensor only
        let mut coordinator =
            CaptureCoordinator::new(capture_dir.clone(), blueprint.capture.queue_capacity);
        for sensor in &blueprint.vehicle.sensors {
            let descriptor = sensor_descriptor(sensor);
            match coordinator.attach(&client, &descriptor, vehicle_actor).await {
                Ok(actor_id) => graph.register_sensor(sensor.id.clone(), actor_id),
                Err(e) => {
                    error!(sensor_id = %sensor.id, error = %e, "sensor attach failed, capture proceeds without it");
                }
            }
        }

        if coordinator.sensor_count() == 0 {
            rig.teardown(&graph).await;
            anyhow::bail!("no sensors attached, aborting capture session");
        }

        info!(
            sensors = coordinator.sensor_count(),
            frames = self.config.frames,
            "Capture loop starting"
        );

        let pilot = blueprint.vehicle.destination.map(|destination| {
            ControlPilot::new(
                Arc::new(MockNavigationAgent::new()),
                destination,
                blueprint.vehicle.min_waypoint_horizon,
            )
        });

        let synchronizer = coordinator
            .synchronizer(Duration::from_secs_f64(blueprint.capture.sync_timeout_sec));
        let mut writer = FrameWriter::new(capture_dir);
        let mut aggregator = CaptureAggregator::default();

        for _ in 0..self.config.frames {
            let target = client.advance_tick().await?;

            // Control command is computed and joined before the next tick;
            // the capture loop never outruns the vehicle.
            if let Some(ref pilot) = pilot {
                pilot.run_tick(&client, vehicle_actor).await?;
            }

            match synchronizer.sync_to(target).await {
                Ok(bundle) => {
                    let started = Instant::now();
                    match writer.write_bundle(&bundle) {
                        Ok(()) => {
                            aggregator.record_bundle(target, started.elapsed().as_secs_f64());
                        }
                        Err(e) => {
                            warn!(frame_id = target, error = %e, "frame persistence failed, skipping frame");
                            aggregator.record_frame_failure();
                        }
                    }
                }
                Err(CaptureError::Timeout { sensor_id, .. }) => {
                    warn!(sensor_id = %sensor_id, frame_id = target, "sync round abandoned");
                    aggregator.record_timeout(&sensor_id);
                }
                Err(e) => {
                    coordinator.shutdown();
                    rig.teardown(&graph).await;
                    return Err(e).context("capture loop failed");
                }
            }
        }

        // Teardown: stop streams first so no callback races actor destruction
        let active_sensors = coordinator.sensor_count();
        let observations = coordinator.metrics();
        coordinator.shutdown();
        rig.teardown(&graph).await;

        let stats = CaptureStats {
            bundles_written: aggregator.bundles_written,
            rounds_timed_out: aggregator.rounds_timed_out,
            frames_failed: aggregator.frames_failed,
            observations,
            duration: start_time.elapsed(),
            active_sensors,
            aggregator,
        };

        info!(
            bundles = stats.bundles_written,
            timeouts = stats.rounds_timed_out,
            "Capture session complete"
        );

        Ok(stats)
    }
}

/// Mock world rendering configuration.
///
/// The scripted light sits well inside the frame so its regions are never
/// edge-clipped; a capture followed by a label pass yields a usable demo
/// dataset.
fn mock_world_config() -> MockWorldConfig {
    MockWorldConfig {
        image_width: 320,
        image_height: 240,
        lidar_points: 256,
        traffic_light: Some(MockTrafficLight {
            x: 150,
            y: 60,
            size: 12,
            color: [255, 0, 0],
        }),
        ..Default::default()
    }
}
