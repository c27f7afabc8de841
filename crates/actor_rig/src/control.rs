//! ControlPilot - per-tick control computation
//!
//! The navigation agent's planning step can take most of a tick, so it runs
//! on a short-lived blocking worker. The worker is joined before the command
//! is applied: at most one control command is ever in flight per vehicle.

use std::sync::Arc;

use contracts::{ActorId, ControlCommand, Location, NavigationAgent, VehicleControlHandler};
use tokio::task;
use tracing::{instrument, trace};

use crate::error::{Result, RigError};

/// Per-vehicle control pilot
pub struct ControlPilot<N: NavigationAgent + 'static> {
    agent: Arc<N>,
    destination: Location,
    min_waypoint_horizon: usize,
}

impl<N: NavigationAgent + 'static> ControlPilot<N> {
    /// Create a pilot driving toward `destination`.
    pub fn new(agent: Arc<N>, destination: Location, min_waypoint_horizon: usize) -> Self {
        Self {
            agent,
            destination,
            min_waypoint_horizon,
        }
    }

    /// Compute and apply one tick's control command.
    ///
    /// The computation is submitted to a blocking worker and awaited to
    /// completion before `apply_vehicle_control` is invoked; issuing the
    /// next command without that join would let two commands race.
    #[instrument(name = "control_run_tick", skip(self, handler))]
    pub async fn run_tick<H: VehicleControlHandler>(
        &self,
        handler: &H,
        vehicle_id: ActorId,
    ) -> Result<ControlCommand> {
        let agent = Arc::clone(&self.agent);
        let destination = self.destination;
        let horizon = self.min_waypoint_horizon;

        let command = task::spawn_blocking(move || {
            agent.compute_control_command(vehicle_id, destination, horizon)
        })
        .await
        .map_err(|e| RigError::ControlJoin {
            vehicle_id,
            message: e.to_string(),
        })??;

        trace!(?command, "applying control command");
        handler.apply_vehicle_control(vehicle_id, command)?;
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ContractError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Agent that records how many computations ran concurrently.
    struct ConcurrencyProbe {
        in_flight: AtomicU32,
        max_in_flight: AtomicU32,
    }

    impl NavigationAgent for ConcurrencyProbe {
        fn compute_control_command(
            &self,
            _vehicle_id: ActorId,
            _destination: Location,
            _min_waypoint_horizon: usize,
        ) -> std::result::Result<ControlCommand, ContractError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(ControlCommand {
                throttle: 0.5,
                ..Default::default()
            })
        }
    }

    struct RecordingHandler {
        applied: Mutex<Vec<(ActorId, ControlCommand)>>,
    }

    impl VehicleControlHandler for RecordingHandler {
        fn apply_vehicle_control(
            &self,
            vehicle_id: ActorId,
            command: ControlCommand,
        ) -> std::result::Result<(), ContractError> {
            self.applied.lock().unwrap().push((vehicle_id, command));
            Ok(())
        }
    }

    #[tokio::test]
    async fn commands_never_overlap_per_vehicle() {
        let agent = Arc::new(ConcurrencyProbe {
            in_flight: AtomicU32::new(0),
            max_in_flight: AtomicU32::new(0),
        });
        let handler = RecordingHandler {
            applied: Mutex::new(Vec::new()),
        };
        let pilot = ControlPilot::new(Arc::clone(&agent), Location::default(), 20);

        for _ in 0..5 {
            pilot.run_tick(&handler, 7).await.unwrap();
        }

        // joined before apply: the worker count never exceeded one
        assert_eq!(agent.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(handler.applied.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn command_is_applied_after_join() {
        let agent = Arc::new(ConcurrencyProbe {
            in_flight: AtomicU32::new(0),
            max_in_flight: AtomicU32::new(0),
        });
        let handler = RecordingHandler {
            applied: Mutex::new(Vec::new()),
        };
        let pilot = ControlPilot::new(agent, Location::default(), 20);

        let command = pilot.run_tick(&handler, 3).await.unwrap();
        assert_eq!(command.throttle, 0.5);

        let applied = handler.applied.lock().unwrap();
        assert_eq!(applied.as_slice(), &[(3, command)]);
    }
}
