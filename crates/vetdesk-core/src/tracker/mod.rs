//! Day-scoped trackers.
//!
//! Both trackers own their working copy in memory, persist every change
//! through the injected [`Store`](crate::store::Store), and poll the
//! [`Clock`](crate::clock::Clock) for day changes independently of each
//! other:
//!
//! | Tracker | Key | On day change |
//! |---|---|---|
//! | [`MetricsTracker`] | `metrics:{day}` | fresh record; old day kept as archive |
//! | [`PatientLog`] | `patientlog:{day}` | emptied; old day removed |

mod metrics;
mod patient_log;

pub use metrics::*;
pub use patient_log::*;

use std::sync::{Mutex, MutexGuard};

/// Lock tracker state, recovering from poisoning.
///
/// Every mutation is a single read-modify-persist step, so a panic inside
/// one leaves the previous consistent value in place.
fn lock_state<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}
