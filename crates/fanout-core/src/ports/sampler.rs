//! DelaySampler port - 遅延値の抽象化
//!
//! 本番は一様乱数、テストは決まった値の列を返す実装に差し替えます。
//! 完了順は遅延値だけで決まるので、値を固定すれば順序も固定できます。

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use rand::Rng;

use crate::domain::MaxDelay;

/// Picks the delay (seconds) for one task.
///
/// Implementations should return a value in `[0, max_delay]`; the fan-out
/// clamps out-of-range samples.
pub trait DelaySampler: Send + Sync {
    fn sample(&self, max_delay: MaxDelay) -> f64;
}

/// Uniform over `[0, max_delay]`, inclusive on both ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSampler;

impl DelaySampler for UniformSampler {
    fn sample(&self, max_delay: MaxDelay) -> f64 {
        let max = max_delay.as_secs_f64();
        if max <= 0.0 {
            return 0.0;
        }
        rand::thread_rng().gen_range(0.0..=max)
    }
}

/// Hands out a fixed sequence of delays, one per `sample` call.
///
/// Once the script runs out the last value is repeated (0.0 for an empty
/// script). Values are clamped into `[0, max_delay]`.
#[derive(Debug, Default)]
pub struct ScriptedSampler {
    script: Mutex<Script>,
}

#[derive(Debug, Default)]
struct Script {
    remaining: VecDeque<f64>,
    last: f64,
}

impl ScriptedSampler {
    pub fn new(delays: impl IntoIterator<Item = f64>) -> Self {
        Self {
            script: Mutex::new(Script {
                remaining: delays.into_iter().collect(),
                last: 0.0,
            }),
        }
    }
}

impl DelaySampler for ScriptedSampler {
    fn sample(&self, max_delay: MaxDelay) -> f64 {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(next) = script.remaining.pop_front() {
            script.last = next;
        }
        max_delay.clamp(script.last)
    }
}
