//! Wall-clock measurement around fan-out runs.

use tokio::time::Instant;

use crate::domain::{FanOutError, MaxDelay, MeasureSummary, RunReport};

use super::fan_out::FanOut;

/// Run one fan-out and record how long it took.
pub async fn measure_fan_out(
    fan_out: &FanOut,
    n: usize,
    max_delay: MaxDelay,
) -> Result<RunReport, FanOutError> {
    let started_at = fan_out.clock().now();
    let start = Instant::now();
    let run = fan_out.run(n, max_delay).await?;
    let elapsed_secs = start.elapsed().as_secs_f64();

    let per_task_secs = if n == 0 { 0.0 } else { elapsed_secs / n as f64 };

    tracing::info!(run_id = %run.run_id, elapsed_secs, per_task_secs, "fan-out measured");

    Ok(RunReport {
        run_id: run.run_id,
        started_at,
        tasks: n,
        max_delay: max_delay.as_secs_f64(),
        delays: run.delays,
        elapsed_secs,
        per_task_secs,
    })
}

/// Measure `repeat` fan-outs one after another.
///
/// Stops at the first failing run.
pub async fn measure_repeated(
    fan_out: &FanOut,
    n: usize,
    max_delay: MaxDelay,
    repeat: usize,
) -> Result<MeasureSummary, FanOutError> {
    let mut runs = Vec::new();
    for _ in 0..repeat {
        runs.push(measure_fan_out(fan_out, n, max_delay).await?);
    }
    Ok(MeasureSummary::from_runs(runs))
}
