//! 采集指标收集模块
//!
//! 汇总同步轮与帧束写入的运行指标，供 CLI 统计输出使用。

use metrics::{counter, gauge, histogram};

/// 记录一次成功写入的帧束
///
/// 每次 FrameWriter 持久化一个完整 bundle 后调用。
pub fn record_bundle_written(frame_id: u64, write_seconds: f64) {
    counter!("datagen_session_bundles_total").increment(1);
    gauge!("datagen_session_last_frame_id").set(frame_id as f64);
    histogram!("datagen_session_write_seconds").record(write_seconds);
}

/// 记录一次超时的同步轮
pub fn record_round_timeout(sensor_id: &str) {
    counter!(
        "datagen_session_timeouts_total",
        "sensor_id" => sensor_id.to_string()
    )
    .increment(1);
}

/// Streaming mean/min/max accumulator (Welford).
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).sqrt()
        }
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            count: self.count,
            mean: self.mean,
            std_dev: self.std_dev(),
            min: if self.count == 0 { 0.0 } else { self.min },
            max: if self.count == 0 { 0.0 } else { self.max },
        }
    }
}

/// Point-in-time view of a `RunningStats`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Session-level aggregation over capture rounds.
#[derive(Debug, Clone, Default)]
pub struct CaptureAggregator {
    /// Bundles persisted
    pub bundles_written: u64,

    /// Rounds abandoned on timeout
    pub rounds_timed_out: u64,

    /// Frames dropped by persistence failures
    pub frames_failed: u64,

    /// Bundle write durations (seconds)
    pub write_seconds: RunningStats,
}

impl CaptureAggregator {
    /// Record a persisted bundle.
    pub fn record_bundle(&mut self, frame_id: u64, write_seconds: f64) {
        self.bundles_written += 1;
        self.write_seconds.push(write_seconds);
        record_bundle_written(frame_id, write_seconds);
    }

    /// Record a timed-out round.
    pub fn record_timeout(&mut self, sensor_id: &str) {
        self.rounds_timed_out += 1;
        record_round_timeout(sensor_id);
    }

    /// Record a frame lost to a persistence failure.
    pub fn record_frame_failure(&mut self) {
        self.frames_failed += 1;
        counter!("datagen_session_frame_failures_total").increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_stats_basics() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0] {
            stats.push(v);
        }

        let summary = stats.summary();
        assert_eq!(summary.count, 4);
        assert!((summary.mean - 2.5).abs() < 1e-9);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert!((summary.std_dev - 1.2909944487358056).abs() < 1e-9);
    }

    #[test]
    fn empty_stats_summary_is_zeroed() {
        let summary = RunningStats::default().summary();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.max, 0.0);
    }

    #[test]
    fn aggregator_counts() {
        let mut agg = CaptureAggregator::default();
        agg.record_bundle(1, 0.01);
        agg.record_bundle(2, 0.02);
        agg.record_timeout("front_rgb");

        assert_eq!(agg.bundles_written, 2);
        assert_eq!(agg.rounds_timed_out, 1);
        assert_eq!(agg.write_seconds.count(), 2);
    }
}
