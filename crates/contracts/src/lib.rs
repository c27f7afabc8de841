//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Clock Model
//! - Uses the simulator's frame counter (`u64`, monotonically non-decreasing per sensor)
//!   as the primary clock; wall-clock time only bounds waits, never alignment.

mod blueprint;
mod bundle;
mod error;
mod label;
mod palette;
mod sensor;
mod sensor_id;
mod sink;
mod world;

pub use blueprint::*;
pub use bundle::FrameBundle;
pub use error::*;
pub use label::*;
pub use palette::*;
pub use sensor::*;
pub use sensor_id::SensorId;
pub use sink::*;
pub use world::*;
