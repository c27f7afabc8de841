//! # Actor Rig
//!
//! Vehicle and sensor actor lifecycle against the external world service.
//!
//! Responsibilities:
//! - Spawn the capture vehicle and track created actors (`ActorRig`,
//!   `RigGraph`), with idempotent teardown
//! - Per-tick control computation on a joined worker (`ControlPilot`)
//! - Mock world client and scripted sensor streams for development and
//!   tests without a simulator (`MockWorldClient`)

mod control;
mod error;
mod mock_world;
mod rig;

pub use control::ControlPilot;
pub use error::{Result, RigError};
pub use mock_world::{MockNavigationAgent, MockTrafficLight, MockWorldClient, MockWorldConfig};
pub use rig::{sensor_descriptor, ActorRig, RigGraph};
