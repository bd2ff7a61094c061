//! FanOut - N 個の遅延タスクを並行に走らせ、完了順に集める
//!
//! # フロー
//! 1. 全タスクを先に spawn する（遅延値は spawn 順にサンプリング）
//! 2. `JoinSet::join_next` で「次に終わったタスク」を待つ
//! 3. 値を結果に追加し、pending から外す（空になるまで繰り返す）
//!
//! どれか 1 つでも失敗したら run 全体が失敗し、途中結果は返しません。

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::Instrument;

use crate::domain::{FanOutError, MaxDelay, RunId};
use crate::ports::{
    Clock, DelaySampler, IdGenerator, Sleeper, SystemClock, TokioSleeper, UlidGenerator,
    UniformSampler,
};

use super::task::DelayTask;

/// Result of one fan-out invocation.
#[derive(Debug, Clone)]
pub struct FanOutRun {
    pub run_id: RunId,
    /// Sampled delays, earliest-finishing first.
    pub delays: Vec<f64>,
}

impl FanOutRun {
    pub fn into_delays(self) -> Vec<f64> {
        self.delays
    }
}

/// Spawns delay tasks and collects their values in completion order.
///
/// Cloning is cheap; clones share the same ports.
#[derive(Clone)]
pub struct FanOut {
    sampler: Arc<dyn DelaySampler>,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl FanOut {
    pub fn builder() -> FanOutBuilder {
        FanOutBuilder::new()
    }

    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }

    /// Run `n` delay tasks concurrently.
    ///
    /// `n == 0` returns immediately without spawning anything.
    pub async fn run(&self, n: usize, max_delay: MaxDelay) -> Result<FanOutRun, FanOutError> {
        let run_id = self.ids.generate_run_id();
        let span = tracing::info_span!(
            "fan_out",
            %run_id,
            tasks = n,
            max_delay = max_delay.as_secs_f64()
        );

        let delays = self.collect(n, max_delay).instrument(span).await?;
        Ok(FanOutRun { run_id, delays })
    }

    async fn collect(&self, n: usize, max_delay: MaxDelay) -> Result<Vec<f64>, FanOutError> {
        if n == 0 {
            tracing::debug!("no tasks requested");
            return Ok(Vec::new());
        }

        let mut pending = JoinSet::new();
        for index in 0..n {
            let delay = max_delay.clamp(self.sampler.sample(max_delay));
            let task = DelayTask::new(index, delay, Arc::clone(&self.sleeper));
            pending.spawn(task.run().in_current_span());
        }
        tracing::debug!(spawned = n, "all delay tasks spawned");

        let mut done = Vec::with_capacity(n);
        while let Some(joined) = pending.join_next().await {
            // returning early drops `pending`, which aborts whatever is still in flight
            let delay = joined
                .map_err(FanOutError::from)
                .and_then(|result| result)
                .inspect_err(|err| {
                    tracing::warn!(%err, collected = done.len(), "delay task failed, aborting fan-out");
                })?;
            done.push(delay);
        }

        tracing::info!(collected = done.len(), "fan-out finished");
        Ok(done)
    }
}

impl Default for FanOut {
    fn default() -> Self {
        FanOutBuilder::new().build()
    }
}

/// FanOutBuilder は FanOut のポートを差し替えて構築する
///
/// # 使用例
/// ```ignore
/// let fan_out = FanOut::builder()
///     .sampler(ScriptedSampler::new([7.0, 2.0, 5.0]))
///     .clock(FixedClock::new(at))
///     .build();
/// ```
///
/// 指定しなかったポートは本番用（UniformSampler, TokioSleeper, SystemClock）になります。
pub struct FanOutBuilder {
    sampler: Arc<dyn DelaySampler>,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
}

impl FanOutBuilder {
    pub fn new() -> Self {
        Self {
            sampler: Arc::new(UniformSampler),
            sleeper: Arc::new(TokioSleeper),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn sampler(mut self, sampler: impl DelaySampler + 'static) -> Self {
        self.sampler = Arc::new(sampler);
        self
    }

    pub fn sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn build(self) -> FanOut {
        let ids = Arc::new(UlidGenerator::new(Arc::clone(&self.clock)));
        FanOut {
            sampler: self.sampler,
            sleeper: self.sleeper,
            clock: self.clock,
            ids,
        }
    }
}

impl Default for FanOutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn `n` uniformly random delay tasks bounded by `max_delay` seconds and
/// return their delays in completion order.
pub async fn fan_out_delays(n: usize, max_delay: f64) -> Result<Vec<f64>, FanOutError> {
    let max_delay = MaxDelay::new(max_delay)?;
    let run = FanOut::default().run(n, max_delay).await?;
    Ok(run.into_delays())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, ScriptedSampler};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    /// 指定した長さ以上の sleep だけ失敗させる
    struct FailLongSleeps {
        limit: Duration,
        completed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Sleeper for FailLongSleeps {
        async fn sleep(&self, duration: Duration) -> Result<(), FanOutError> {
            if duration >= self.limit {
                tokio::time::sleep(self.limit).await;
                return Err(FanOutError::Interrupted(format!("{duration:?}")));
            }
            tokio::time::sleep(duration).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct PanickingSleeper;

    #[async_trait]
    impl Sleeper for PanickingSleeper {
        async fn sleep(&self, _duration: Duration) -> Result<(), FanOutError> {
            panic!("timer driver gone");
        }
    }

    fn scripted(delays: impl IntoIterator<Item = f64>) -> FanOut {
        FanOut::builder().sampler(ScriptedSampler::new(delays)).build()
    }

    #[rstest]
    #[case(1, 1.0)]
    #[case(5, 10.0)]
    #[case(50, 3.0)]
    #[case(3, 0.0)]
    #[tokio::test(start_paused = true)]
    async fn returns_n_values_within_bound(#[case] n: usize, #[case] max: f64) {
        let delays = fan_out_delays(n, max).await.unwrap();

        assert_eq!(delays.len(), n);
        assert!(delays.iter().all(|d| (0.0..=max).contains(d)));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_tasks_returns_empty_immediately() {
        let start = Instant::now();
        let delays = fan_out_delays(0, 10.0).await.unwrap();

        assert!(delays.is_empty());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn all_zero_delays_complete_instantly() {
        let start = Instant::now();
        let delays = fan_out_delays(5, 0.0).await.unwrap();

        assert_eq!(delays, vec![0.0; 5]);
        assert!(start.elapsed() < Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn results_arrive_in_completion_order() {
        // A=7, B=2, C=5 → B, C, A
        let run = scripted([7.0, 2.0, 5.0])
            .run(3, MaxDelay::new(10.0).unwrap())
            .await
            .unwrap();

        assert_eq!(run.delays, vec![2.0, 5.0, 7.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn scripted_delays_come_back_ascending() {
        let script = [9.0, 1.0, 8.0, 3.0, 6.0, 2.0, 7.0, 4.0, 5.0];
        let delays = scripted(script)
            .run(script.len(), MaxDelay::new(10.0).unwrap())
            .await
            .unwrap()
            .into_delays();

        let mut expected = script.to_vec();
        expected.sort_by(f64::total_cmp);
        assert_eq!(delays, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn tasks_run_concurrently_not_sequentially() {
        let n = 8;
        let d = 10.0;
        let start = Instant::now();
        let delays = fan_out_delays(n, d).await.unwrap();
        let elapsed = start.elapsed().as_secs_f64();

        let slowest = delays.iter().copied().fold(0.0, f64::max);
        assert!(elapsed < 0.9 * n as f64 * d);
        assert!(elapsed >= slowest);
        assert!(elapsed <= d + 0.01);
    }

    #[tokio::test]
    async fn tasks_run_concurrently_on_the_real_clock() {
        let n = 10;
        let d = 0.05;
        let start = std::time::Instant::now();
        fan_out_delays(n, d).await.unwrap();

        assert!(start.elapsed().as_secs_f64() < 0.9 * n as f64 * d);
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[tokio::test]
    async fn rejects_invalid_max_delay(#[case] max: f64) {
        let err = fan_out_delays(3, max).await.unwrap_err();
        assert!(matches!(err, FanOutError::InvalidMaxDelay(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_task_fails_whole_run() {
        let completed = Arc::new(AtomicUsize::new(0));
        let fan_out = FanOut::builder()
            .sampler(ScriptedSampler::new([1.0, 5.0, 9.0]))
            .sleeper(FailLongSleeps {
                limit: Duration::from_secs(5),
                completed: Arc::clone(&completed),
            })
            .build();

        let start = Instant::now();
        let err = fan_out.run(3, MaxDelay::new(10.0).unwrap()).await.unwrap_err();

        assert!(matches!(err, FanOutError::Interrupted(_)));
        // 9 秒のタスクは待たずに中断される
        assert!(start.elapsed() < Duration::from_secs(9));
        assert_eq!(completed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panicking_task_surfaces_as_error() {
        let fan_out = FanOut::builder().sleeper(PanickingSleeper).build();
        let err = fan_out.run(2, MaxDelay::new(1.0).unwrap()).await.unwrap_err();

        assert!(matches!(&err, FanOutError::TaskPanicked(msg) if msg == "timer driver gone"));
    }

    #[tokio::test(start_paused = true)]
    async fn run_id_uses_injected_clock() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let fan_out = FanOut::builder().clock(FixedClock::new(at)).build();

        let run = fan_out.run(0, MaxDelay::default()).await.unwrap();

        assert_eq!(fan_out.clock().now(), at);
        assert_eq!(run.run_id.as_ulid().timestamp_ms(), at.timestamp_millis() as u64);
    }
}
