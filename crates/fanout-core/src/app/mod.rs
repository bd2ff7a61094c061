//! App - アプリケーション層
//!
//! ports を組み合わせて fan-out を実装します。
//!
//! # 主要コンポーネント
//! - **DelayTask**: 1 回だけ中断して遅延値を返すタスク
//! - **FanOut / FanOutBuilder**: N 個のタスクを並行実行し、完了順に集める
//! - **measure**: 経過時間を測るハーネス（CLI から呼ばれる）

pub mod fan_out;
pub mod measure;
pub mod task;

pub use self::fan_out::{FanOut, FanOutBuilder, FanOutRun, fan_out_delays};
pub use self::measure::{measure_fan_out, measure_repeated};
pub use self::task::{DelayTask, spawn_delay_task, wait_random};
