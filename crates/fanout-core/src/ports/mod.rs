//! Ports - 抽象化レイヤー
//!
//! fan-out が外部に依存する部分（乱数・タイマー・時刻・ID 生成）を trait として定義します。
//! テストでは決定的な実装（ScriptedSampler, FixedClock など）に差し替えます。

pub mod clock;
pub mod id_generator;
pub mod sampler;
pub mod sleeper;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::sampler::{DelaySampler, ScriptedSampler, UniformSampler};
pub use self::sleeper::{Sleeper, TokioSleeper};
