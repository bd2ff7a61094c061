//! Domain model (delay bounds, run IDs, errors, reports).

pub mod delay;
pub mod errors;
pub mod ids;
pub mod report;

pub use delay::MaxDelay;
pub use errors::FanOutError;
pub use ids::{Id, IdMarker, RunId};
pub use report::{MeasureSummary, RunReport};
