//! Domain models for the front-office core.

mod metrics;
mod patient_log;

pub use metrics::*;
pub use patient_log::*;
