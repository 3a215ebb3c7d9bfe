//! Wall-clock time driven by the host loop.

use chrono::{Local, NaiveDateTime, Utc};
use std::time::{Duration, Instant};

use super::{Clock, TimerCallback, TimerHandle, TimerQueue};

/// Local system time. Timers fire when the host calls [`SystemClock::pump`].
pub struct SystemClock {
    started: Instant,
    queue: TimerQueue,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            queue: TimerQueue::new(),
        }
    }

    /// Fire every timer that has come due. Returns the number fired.
    pub fn pump(&self) -> usize {
        self.queue.run_until(self.started.elapsed(), |_| {})
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn every(&self, period: Duration, callback: TimerCallback) -> TimerHandle {
        self.queue.every(period, callback)
    }

    fn after(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        self.queue.after(delay, callback)
    }
}
