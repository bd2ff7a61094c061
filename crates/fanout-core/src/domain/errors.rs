use std::any::Any;

use thiserror::Error;
use tokio::task::JoinError;

/// Errors surfaced by a fan-out run.
///
/// Any of these aborts the whole run; partial results are never returned.
#[derive(Debug, Error)]
pub enum FanOutError {
    #[error("invalid max_delay={0}: must be a finite, non-negative number of seconds")]
    InvalidMaxDelay(f64),

    #[error("invalid sampled delay={0}")]
    InvalidDelay(f64),

    #[error("delay task interrupted: {0}")]
    Interrupted(String),

    #[error("delay task panicked: {0}")]
    TaskPanicked(String),

    #[error("delay task was cancelled")]
    TaskCancelled,
}

impl From<JoinError> for FanOutError {
    fn from(err: JoinError) -> Self {
        if err.is_panic() {
            FanOutError::TaskPanicked(panic_message(err.into_panic()))
        } else {
            FanOutError::TaskCancelled
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
