//! fanout-core
//!
//! Core building blocks for concurrent delay fan-out.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（delay, ids, errors, report）
//! - **ports**: 抽象化レイヤー（DelaySampler, Sleeper, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（DelayTask, FanOut, measure）
//! - **config**: TOML 設定の読み込み

pub mod app;
pub mod config;
pub mod domain;
pub mod ports;

pub use app::{FanOut, FanOutBuilder, FanOutRun, fan_out_delays};
pub use config::{ConfigError, FanOutConfig};
pub use domain::{FanOutError, MaxDelay, RunId, RunReport};
