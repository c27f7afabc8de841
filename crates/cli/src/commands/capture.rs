//! `capture` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::CaptureArgs;
use crate::pipeline::{CapturePipeline, PipelineConfig};

/// Execute the `capture` command
pub async fn run_capture(args: &CaptureArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref host) = args.host {
        info!(host = %host, "Overriding world host from CLI");
        blueprint.world.host = host.clone();
    }
    if let Some(port) = args.port {
        info!(port = %port, "Overriding world port from CLI");
        blueprint.world.port = port;
    }

    info!(
        host = %blueprint.world.host,
        port = blueprint.world.port,
        vehicle = %blueprint.vehicle.blueprint,
        sensors = blueprint.vehicle.sensors.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        blueprint,
        frames: args.frames,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    info!("Starting capture session...");
    let stats = CapturePipeline::new(pipeline_config).run().await?;
    stats.print_summary();

    Ok(())
}

fn print_config_summary(blueprint: &contracts::HarvestBlueprint) {
    println!("Configuration summary:");
    println!("  world:    {}:{}", blueprint.world.host, blueprint.world.port);
    println!(
        "  vehicle:  {} ({})",
        blueprint.vehicle.id, blueprint.vehicle.blueprint
    );
    for sensor in &blueprint.vehicle.sensors {
        println!("  sensor:   {} ({:?})", sensor.id, sensor.modality);
    }
    println!(
        "  capture:  {} (timeout {}s)",
        blueprint.capture.raw_data_root.display(),
        blueprint.capture.sync_timeout_sec
    );
}
