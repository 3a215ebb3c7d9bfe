//! Wall clock and cooperative timer scheduling.
//!
//! Trackers never sleep or spawn threads. Periodic work (the consultation
//! tick, the day-boundary poll, deferred chat replies) is registered with a
//! [`Clock`] and fired when the host loop drives it:
//!
//! ```text
//! host loop ──► ManualClock::advance / SystemClock::pump
//!                        │
//!                        ▼
//!                  TimerQueue (due, registration order)
//!                        │
//!          ┌─────────────┼──────────────┐
//!          ▼             ▼              ▼
//!    metrics tick   rollover poll   chat reply
//! ```

mod manual;
mod system;
mod timers;

pub use manual::*;
pub use system::*;
pub use timers::*;

use chrono::NaiveDateTime;
use std::fmt;
use std::time::Duration;

/// Day key format used to partition persisted state.
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Callback registered with a clock.
pub type TimerCallback = Box<dyn FnMut() + Send>;

/// Time source and scheduler consumed by the trackers.
pub trait Clock: Send + Sync {
    /// Current local wall time.
    fn now(&self) -> NaiveDateTime;

    /// Calendar day of [`Clock::now`] as `YYYY-MM-DD`.
    fn today(&self) -> String {
        day_key(&self.now())
    }

    /// Milliseconds since the Unix epoch of a real instant, for ordering.
    ///
    /// Unlike [`Clock::now`], this does not repeat when local time is set back.
    fn now_millis(&self) -> i64;

    /// Run `callback` every `period` until the handle is cancelled.
    fn every(&self, period: Duration, callback: TimerCallback) -> TimerHandle;

    /// Run `callback` once after `delay`.
    fn after(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;
}

/// Format a wall time as a day key.
pub fn day_key(time: &NaiveDateTime) -> String {
    time.format(DAY_KEY_FORMAT).to_string()
}

/// Identifier of a scheduled callback.
pub type TimerId = u64;

/// Cancels one concrete scheduled callback.
pub struct TimerHandle {
    id: TimerId,
    canceller: Box<dyn Fn(TimerId) + Send + Sync>,
}

impl TimerHandle {
    pub fn new(id: TimerId, canceller: impl Fn(TimerId) + Send + Sync + 'static) -> Self {
        Self {
            id,
            canceller: Box::new(canceller),
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Remove the callback from its scheduler.
    pub fn cancel(self) {
        (self.canceller)(self.id);
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_day_key_format() {
        let time = NaiveDate::from_ymd_opt(2024, 11, 5)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(day_key(&time), "2024-11-05");
    }

    #[test]
    fn test_today_follows_now() {
        let clock = ManualClock::at(2024, 11, 20, 23, 59, 30);
        assert_eq!(clock.today(), "2024-11-20");

        clock.advance(Duration::from_secs(30));
        assert_eq!(clock.today(), "2024-11-21");
    }
}
