//! Capture session statistics.

use std::time::Duration;

use capture::MetricsSnapshot;
use observability::CaptureAggregator;

/// Statistics from one capture session
#[derive(Debug, Clone, Default)]
pub struct CaptureStats {
    /// Frame bundles persisted
    pub bundles_written: u64,

    /// Rounds abandoned on sync timeout
    pub rounds_timed_out: u64,

    /// Frames lost to persistence failures
    pub frames_failed: u64,

    /// Coordinator-level observation counters
    pub observations: MetricsSnapshot,

    /// Total session duration
    pub duration: Duration,

    /// Sensors that attached successfully
    pub active_sensors: usize,

    /// Write-duration aggregation
    pub aggregator: CaptureAggregator,
}

impl CaptureStats {
    /// Bundles per second throughput
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.bundles_written as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Timed-out rounds as a percentage of all rounds
    pub fn timeout_rate(&self) -> f64 {
        let total = self.bundles_written + self.rounds_timed_out + self.frames_failed;
        if total > 0 {
            (self.rounds_timed_out as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let write = self.aggregator.write_seconds.summary();

        println!("\nCapture session statistics");
        println!("  duration:        {:.2}s", self.duration.as_secs_f64());
        println!("  active sensors:  {}", self.active_sensors);
        println!(
            "  bundles:         {} written ({:.1}/s)",
            self.bundles_written,
            self.fps()
        );
        println!(
            "  rounds:          {} timed out ({:.1}%), {} failed writes",
            self.rounds_timed_out,
            self.timeout_rate(),
            self.frames_failed
        );
        println!(
            "  observations:    {} received, {} dropped, {} discarded",
            self.observations.observations_received,
            self.observations.observations_dropped,
            self.observations.observations_discarded
        );
        if write.count > 0 {
            println!(
                "  write time:      {:.1}ms avg ({:.1}ms max)",
                write.mean * 1000.0,
                write.max * 1000.0
            );
        }
    }
}
