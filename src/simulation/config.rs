//! Run configuration for [`crate::simulation::engine::Simulator::run`]:
//! the period range, loop count, and metrics output a run needs, with no
//! assumption about the chain's node count or topology.

use std::path::PathBuf;

/// `start..=end` period range, repeated `loops` times, with optional
/// metrics output.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub start_period: i64,
    pub end_period: i64,
    pub loops: i64,
    /// Metrics file path; `None` means metrics are dropped unless an
    /// extra sink was attached via `Simulator::with_extra_sink`.
    pub output_path: Option<PathBuf>,
    /// Rotate the metrics file once it exceeds this many bytes. `0` never
    /// rotates.
    pub max_bytes: u64,
}

impl RunConfig {
    pub fn new(start_period: i64, end_period: i64) -> Self {
        Self {
            start_period,
            end_period,
            loops: 1,
            output_path: None,
            max_bytes: 0,
        }
    }

    /// `run(end_period)`: start at period 1.
    pub fn single(end_period: i64) -> Self {
        Self::new(1, end_period)
    }

    pub fn with_loops(mut self, loops: i64) -> Self {
        self.loops = loops;
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Number of periods in one loop of `start..=end`.
    pub fn periods_per_loop(&self) -> i64 {
        self.end_period - self.start_period + 1
    }
}
