//! Capture pipeline orchestration.

mod orchestrator;
mod stats;

pub use orchestrator::{CapturePipeline, PipelineConfig};
pub use stats::CaptureStats;
