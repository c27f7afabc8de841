//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟 e2e 测试（无需仿真器）

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
        assert_eq!(contracts::LabelClass::TrafficLightRed.id(), 81);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use actor_rig::{
        sensor_descriptor, ActorRig, ControlPilot, MockNavigationAgent, MockTrafficLight,
        MockWorldClient, MockWorldConfig, RigGraph,
    };
    use capture::{CaptureCoordinator, CaptureError, FrameWriter};
    use contracts::{
        BundleSink, HarvestBlueprint, Location, SensorModality, WorldClient,
    };
    use labeling::LabelPass;
    use tempfile::tempdir;

    const CONFIG: &str = r#"
[world]
host = "localhost"
port = 2000

[vehicle]
id = "ego"
blueprint = "vehicle.tesla.cybertruck"

[[vehicle.sensors]]
id = "front_rgb"
modality = "camera_rgb"

[[vehicle.sensors]]
id = "front_seg"
modality = "camera_semantic_seg"

[[vehicle.sensors]]
id = "roof_lidar"
modality = "lidar"

[capture]
queue_capacity = 32
sync_timeout_sec = 0.2
"#;

    fn load_blueprint() -> HarvestBlueprint {
        config_loader::ConfigLoader::load_from_str(CONFIG, config_loader::ConfigFormat::Toml)
            .unwrap()
    }

    /// World with a 10x10 red light at (50, 50) in a 100x100 frame.
    async fn scripted_world() -> MockWorldClient {
        let mut client = MockWorldClient::with_config(MockWorldConfig {
            image_width: 100,
            image_height: 100,
            lidar_points: 32,
            traffic_light: Some(MockTrafficLight {
                x: 50,
                y: 50,
                size: 10,
                color: [255, 0, 0],
            }),
            ..Default::default()
        });
        client.connect("localhost", 2000).await.unwrap();
        client
    }

    /// End-to-end: capture -> synchronize -> persist -> label.
    ///
    /// 验证完整的数据流：
    /// 1. MockWorldClient 逐 tick 生成传感器数据
    /// 2. FrameSynchronizer 对齐到目标帧
    /// 3. FrameWriter 持久化原始数据
    /// 4. LabelPass 产出数据集条目
    #[tokio::test]
    async fn test_e2e_capture_and_label() {
        let blueprint = load_blueprint();
        let client = scripted_world().await;

        let rig = ActorRig::new(client.clone());
        let mut graph = RigGraph::new();
        let vehicle = rig.spawn_vehicle(&blueprint.vehicle).await.unwrap();
        graph.register_vehicle(blueprint.vehicle.id.clone(), vehicle);

        let raw_root = tempdir().unwrap();
        let vehicle_type = client.vehicle_type_id(vehicle).await.unwrap();
        let capture_dir = capture::capture_directory(
            raw_root.path(),
            "record2021_1104_2356",
            &vehicle_type,
            vehicle,
        );

        let mut coordinator =
            CaptureCoordinator::new(capture_dir.clone(), blueprint.capture.queue_capacity);
        for sensor in &blueprint.vehicle.sensors {
            let descriptor = sensor_descriptor(sensor);
            let actor = coordinator
                .attach(&client, &descriptor, vehicle)
                .await
                .unwrap();
            graph.register_sensor(sensor.id.clone(), actor);
        }
        assert_eq!(coordinator.sensor_count(), 3);

        let synchronizer = coordinator.synchronizer(Duration::from_millis(200));
        let mut writer = FrameWriter::new(capture_dir.clone());

        for _ in 0..3 {
            let target = client.advance_tick().await.unwrap();
            let bundle = synchronizer.sync_to(target).await.unwrap();
            assert_eq!(bundle.len(), 3);
            // persist through the sink seam
            writer.write(&bundle).await.unwrap();
        }

        // raw capture layout
        assert!(capture_dir.join("0000000001.png").exists());
        assert!(capture_dir.join("seg").join("0000000001.png").exists());
        assert!(capture_dir.join("0000000001.npy").exists());
        assert!(capture_dir.join("0000000003.png").exists());

        coordinator.shutdown();
        rig.teardown(&graph).await;

        // offline label pass over the recording
        let dataset = tempdir().unwrap();
        let stats = LabelPass::new(capture_dir, Some(dataset.path().to_path_buf()))
            .run()
            .unwrap();

        assert_eq!(stats.frames_scanned, 3);
        assert_eq!(stats.frames_labeled, 3);
        assert_eq!(stats.labels_emitted, 3);

        let line =
            std::fs::read_to_string(dataset.path().join("labels/0000000001.txt")).unwrap();
        // one red light, centered at (55, 55) of a 100x100 frame
        assert_eq!(line, "81 0.55 0.55 0.1 0.1\n");

        assert!(dataset.path().join("images/0000000001.png").exists());
    }

    /// A world that never ticks produces a timeout round and no files.
    #[tokio::test]
    async fn test_e2e_timeout_leaves_no_files() {
        let blueprint = load_blueprint();
        let client = scripted_world().await;

        let rig = ActorRig::new(client.clone());
        let vehicle = rig.spawn_vehicle(&blueprint.vehicle).await.unwrap();

        let raw_root = tempdir().unwrap();
        let capture_dir = raw_root.path().join("capture");
        let mut coordinator = CaptureCoordinator::new(capture_dir.clone(), 8);
        let descriptor = sensor_descriptor(&blueprint.vehicle.sensors[0]);
        coordinator
            .attach(&client, &descriptor, vehicle)
            .await
            .unwrap();

        let synchronizer = coordinator.synchronizer(Duration::from_millis(50));
        let err = synchronizer.sync_to(1).await.unwrap_err();
        assert!(matches!(err, CaptureError::Timeout { .. }));

        // nothing persisted for the abandoned round
        let entries: Vec<_> = std::fs::read_dir(&capture_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .collect();
        assert!(entries.is_empty());
    }

    /// Frames without a lit traffic light never produce dataset entries.
    #[tokio::test]
    async fn test_e2e_unlit_world_produces_empty_dataset() {
        let blueprint = load_blueprint();
        let mut client = MockWorldClient::with_config(MockWorldConfig {
            image_width: 100,
            image_height: 100,
            traffic_light: None,
            ..Default::default()
        });
        client.connect("localhost", 2000).await.unwrap();

        let rig = ActorRig::new(client.clone());
        let vehicle = rig.spawn_vehicle(&blueprint.vehicle).await.unwrap();

        let raw_root = tempdir().unwrap();
        let capture_dir = raw_root.path().join("capture");
        let mut coordinator = CaptureCoordinator::new(capture_dir.clone(), 8);
        for sensor in &blueprint.vehicle.sensors[..2] {
            coordinator
                .attach(&client, &sensor_descriptor(sensor), vehicle)
                .await
                .unwrap();
        }

        let synchronizer = coordinator.synchronizer(Duration::from_millis(200));
        let mut writer = FrameWriter::new(capture_dir.clone());
        let target = client.advance_tick().await.unwrap();
        let bundle = synchronizer.sync_to(target).await.unwrap();
        writer.write_bundle(&bundle).unwrap();

        let dataset = tempdir().unwrap();
        let stats = LabelPass::new(capture_dir, Some(dataset.path().to_path_buf()))
            .run()
            .unwrap();

        assert_eq!(stats.frames_scanned, 1);
        assert_eq!(stats.frames_labeled, 0);
        assert!(!dataset.path().join("images").exists());
        assert!(!dataset.path().join("labels").exists());
    }

    /// Control pilot drives the vehicle through the world-side handler.
    #[tokio::test]
    async fn test_control_pilot_applies_joined_command() {
        let client = scripted_world().await;
        let vehicle = client
            .spawn_vehicle("vehicle.tesla.cybertruck", None)
            .await
            .unwrap();

        let agent = Arc::new(MockNavigationAgent::new());
        let pilot = ControlPilot::new(
            Arc::clone(&agent),
            Location {
                x: 100.0,
                y: -20.0,
                z: 0.0,
            },
            20,
        );

        for _ in 0..4 {
            client.advance_tick().await.unwrap();
            pilot.run_tick(&client, vehicle).await.unwrap();
        }

        assert_eq!(agent.computed_count(), 4);
        let (id, command) = client.last_control().unwrap();
        assert_eq!(id, vehicle);
        assert_eq!(command.throttle, 0.5);
    }

    /// Sensor spawn failure is surfaced and leaves the rest of the session usable.
    #[tokio::test]
    async fn test_sensor_spawn_failure_is_isolated() {
        let blueprint = load_blueprint();
        let mut client = MockWorldClient::with_config(MockWorldConfig {
            fail_blueprints: vec!["sensor.lidar.ray_cast".into()],
            ..Default::default()
        });
        client.connect("localhost", 2000).await.unwrap();

        let rig = ActorRig::new(client.clone());
        let vehicle = rig.spawn_vehicle(&blueprint.vehicle).await.unwrap();

        let raw_root = tempdir().unwrap();
        let mut coordinator = CaptureCoordinator::new(raw_root.path().join("capture"), 8);

        let mut attached = 0;
        for sensor in &blueprint.vehicle.sensors {
            match coordinator
                .attach(&client, &sensor_descriptor(sensor), vehicle)
                .await
            {
                Ok(_) => attached += 1,
                Err(e) => assert!(matches!(e, CaptureError::Attach { .. })),
            }
        }

        // lidar failed, both cameras attached
        assert_eq!(attached, 2);
        assert_eq!(coordinator.sensor_count(), 2);
        assert!(coordinator.handle("roof_lidar").is_none());
        assert_eq!(
            coordinator.handle("front_seg").map(|h| h.modality),
            Some(SensorModality::CameraSemanticSeg)
        );
    }
}
