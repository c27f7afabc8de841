//! # Capture
//!
//! Concurrent per-sensor data capture with frame-synchronized persistence.
//!
//! Responsibilities:
//! - Register spawned sensors and their dedicated observation queues
//!   (`CaptureCoordinator`)
//! - Align independently-clocked sensor streams to a target frame id
//!   (`FrameSynchronizer`)
//! - Decode and persist complete frame bundles to the raw-capture layout
//!   (`FrameWriter`)
//!
//! ## Usage Example
//!
//! ```ignore
//! let mut coordinator = CaptureCoordinator::new(capture_dir, 100);
//! for descriptor in &descriptors {
//!     coordinator.attach(&world, descriptor, vehicle_actor).await?;
//! }
//!
//! let synchronizer = coordinator.synchronizer(Duration::from_secs_f64(1.0));
//! let mut writer = FrameWriter::new(capture_dir);
//!
//! loop {
//!     let target = world.advance_tick().await?;
//!     match synchronizer.sync_to(target).await {
//!         Ok(bundle) => writer.write(&bundle).await?,
//!         Err(e) if e.is_frame_local() => continue,
//!         Err(e) => return Err(e.into()),
//!     }
//! }
//! coordinator.shutdown();
//! ```

mod coordinator;
mod error;
mod metrics;
mod npy;
mod synchronizer;
mod writer;

pub use crate::coordinator::{CaptureCoordinator, SensorHandle};
pub use crate::error::{CaptureError, Result};
pub use crate::metrics::{CaptureMetrics, MetricsSnapshot};
pub use crate::synchronizer::FrameSynchronizer;
pub use crate::writer::{capture_directory, session_stamp, FrameWriter};
