//! Run reports produced by the measurement harness.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::RunId;

/// What one measured fan-out produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub tasks: usize,
    pub max_delay: f64,
    /// Delays in completion order.
    pub delays: Vec<f64>,
    pub elapsed_secs: f64,
    /// `elapsed_secs / tasks`, or 0 for an empty run.
    pub per_task_secs: f64,
}

impl RunReport {
    /// Largest delay observed, i.e. the lower bound on `elapsed_secs`.
    pub fn slowest(&self) -> Option<f64> {
        self.delays.iter().copied().reduce(f64::max)
    }
}

/// Aggregate over repeated runs.
#[derive(Debug, Clone, Serialize)]
pub struct MeasureSummary {
    pub runs: Vec<RunReport>,
    pub mean_elapsed_secs: f64,
}

impl MeasureSummary {
    pub fn from_runs(runs: Vec<RunReport>) -> Self {
        let mean_elapsed_secs = if runs.is_empty() {
            0.0
        } else {
            runs.iter().map(|r| r.elapsed_secs).sum::<f64>() / runs.len() as f64
        };
        Self {
            runs,
            mean_elapsed_secs,
        }
    }
}
