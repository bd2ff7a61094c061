//! MaxDelay - 遅延の上限値
//!
//! # 学習ポイント
//! - Newtype パターンで「検証済みの値」を型で表現
//! - 生の `f64` を受け取るのは境界（`MaxDelay::new`）だけ

use std::fmt;
use std::time::Duration;

use super::errors::FanOutError;

/// Inclusive upper bound (seconds) for a delay task's random sample.
///
/// Always finite, non-negative and representable as a `Duration`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct MaxDelay(f64);

impl MaxDelay {
    /// Upper bound used by `wait_random` when the caller has no preference.
    pub const DEFAULT_SECS: f64 = 10.0;

    pub const ZERO: MaxDelay = MaxDelay(0.0);

    /// 上限値を検証して作成
    ///
    /// 負の値・NaN・無限大・`Duration` に収まらない値は
    /// `FanOutError::InvalidMaxDelay` になる。
    pub fn new(secs: f64) -> Result<Self, FanOutError> {
        if !secs.is_finite() || secs < 0.0 || Duration::try_from_secs_f64(secs).is_err() {
            return Err(FanOutError::InvalidMaxDelay(secs));
        }
        Ok(Self(secs))
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0
    }

    /// Clamp a sampled value into `[0, max]`.
    ///
    /// NaN is passed through untouched so that `DelayTask::run` can reject it.
    pub fn clamp(self, secs: f64) -> f64 {
        secs.clamp(0.0, self.0)
    }
}

impl Default for MaxDelay {
    fn default() -> Self {
        Self(Self::DEFAULT_SECS)
    }
}

impl fmt::Display for MaxDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl TryFrom<f64> for MaxDelay {
    type Error = FanOutError;

    fn try_from(secs: f64) -> Result<Self, Self::Error> {
        Self::new(secs)
    }
}
