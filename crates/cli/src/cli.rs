//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CARLA Datagen - traffic-light dataset pipeline for the CARLA simulator
#[derive(Parser, Debug)]
#[command(
    name = "carla-datagen",
    author,
    version,
    about = "CARLA traffic-light dataset pipeline",
    long_about = "Captures frame-synchronized multi-sensor recordings from a simulated \n\
                  vehicle and converts paired RGB/segmentation frames into a YOLO-format \n\
                  traffic-light detection dataset."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "CARLA_DATAGEN_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "CARLA_DATAGEN_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a capture session
    Capture(CaptureArgs),

    /// Label a recorded capture directory
    Label(LabelArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `capture` command
#[derive(Parser, Debug, Clone)]
pub struct CaptureArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "CARLA_DATAGEN_CONFIG"
    )]
    pub config: PathBuf,

    /// Override world service host from configuration
    #[arg(long, env = "CARLA_HOST")]
    pub host: Option<String>,

    /// Override world service port from configuration
    #[arg(long, env = "CARLA_PORT")]
    pub port: Option<u16>,

    /// Number of frames to capture
    #[arg(long, default_value = "100", env = "CARLA_DATAGEN_FRAMES")]
    pub frames: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "CARLA_DATAGEN_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `label` command
#[derive(Parser, Debug, Clone)]
pub struct LabelArgs {
    /// Recorded capture directory (the one holding <frame>.png and seg/)
    #[arg(short, long)]
    pub data_path: PathBuf,

    /// Dataset output root (default: yolo_dataset next to the capture dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
