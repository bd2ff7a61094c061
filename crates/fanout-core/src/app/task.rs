//! DelayTask - 1 つの遅延タスク
//!
//! ライフサイクル: created → suspended → completed → collected → discarded
//! collect 以降は fan-out 側の責務です。

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::domain::{FanOutError, MaxDelay};
use crate::ports::{DelaySampler, Sleeper, TokioSleeper, UniformSampler};

/// A unit of concurrent work: suspend once for `delay` seconds, then yield it.
pub struct DelayTask {
    index: usize,
    delay: f64,
    sleeper: Arc<dyn Sleeper>,
}

impl DelayTask {
    /// `index` is the spawn position, only used for logging.
    pub fn new(index: usize, delay: f64, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            index,
            delay,
            sleeper,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    pub async fn run(self) -> Result<f64, FanOutError> {
        let duration = Duration::try_from_secs_f64(self.delay)
            .map_err(|_| FanOutError::InvalidDelay(self.delay))?;

        self.sleeper.sleep(duration).await?;

        tracing::debug!(index = self.index, delay = self.delay, "delay task completed");
        Ok(self.delay)
    }
}

/// Wait a uniformly random delay in `[0, max_delay]` and return it.
pub async fn wait_random(max_delay: MaxDelay) -> Result<f64, FanOutError> {
    let delay = UniformSampler.sample(max_delay);
    DelayTask::new(0, delay, Arc::new(TokioSleeper)).run().await
}

/// Schedule `wait_random` on the current runtime and return its handle.
///
/// Must be called from within a tokio runtime.
pub fn spawn_delay_task(max_delay: MaxDelay) -> JoinHandle<Result<f64, FanOutError>> {
    tokio::spawn(wait_random(max_delay))
}
