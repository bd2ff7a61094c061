//! Sleeper port - タスクの中断（suspend）の抽象化
//!
//! 各 Delay Task は一度だけ `sleep` で中断します。
//! 失敗する Sleeper を注入すると、失敗の伝播をテストできます。

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::FanOutError;

#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend the calling task for `duration`.
    ///
    /// An `Err` means the suspension was interrupted; the fan-out treats it
    /// as a hard failure.
    async fn sleep(&self, duration: Duration) -> Result<(), FanOutError>;
}

/// tokio のタイマーで中断する（本番用）
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) -> Result<(), FanOutError> {
        tokio::time::sleep(duration).await;
        Ok(())
    }
}
