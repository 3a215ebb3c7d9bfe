//! Manually driven clock.

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Mutex;
use std::time::Duration;

use super::{Clock, TimerCallback, TimerHandle, TimerQueue};

/// Clock whose time only moves when told to.
///
/// Used by tests and by hosts that already own a frame loop.
///
/// Two times are kept: the local wall time, which [`ManualClock::set_now`]
/// may move anywhere, and an instant that only moves forward with
/// [`ManualClock::advance`].
pub struct ManualClock {
    wall: Mutex<NaiveDateTime>,
    /// Instant of the starting wall time, in epoch milliseconds
    epoch_millis: i64,
    queue: TimerQueue,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            wall: Mutex::new(start),
            epoch_millis: start.and_utc().timestamp_millis(),
            queue: TimerQueue::new(),
        }
    }

    /// Start at a local date and time. Out-of-range components fall back to
    /// midnight of 1970-01-01.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        let start = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, min, sec))
            .unwrap_or_default();
        Self::new(start)
    }

    /// Jump the wall time without firing timers. The instant is unchanged,
    /// as with a correction of the local clock.
    pub fn set_now(&self, time: NaiveDateTime) {
        *self.wall.lock().unwrap_or_else(|e| e.into_inner()) = time;
    }

    /// Move time forward, firing due timers in order.
    ///
    /// The wall time is moved to each timer's due instant before its
    /// callback runs. Returns the number of callbacks fired.
    pub fn advance(&self, by: Duration) -> usize {
        let base_elapsed = self.queue.elapsed();
        let base_wall = self.now();
        let to_wall = |elapsed: Duration| {
            let delta = elapsed.saturating_sub(base_elapsed);
            base_wall + chrono::Duration::from_std(delta).unwrap_or_else(|_| chrono::Duration::zero())
        };

        let fired = self
            .queue
            .run_until(base_elapsed + by, |due| self.set_now(to_wall(due)));
        self.set_now(to_wall(base_elapsed + by));
        fired
    }

    /// Number of scheduled timers.
    pub fn pending_timers(&self) -> usize {
        self.queue.pending()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.wall.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn now_millis(&self) -> i64 {
        let driven = i64::try_from(self.queue.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.epoch_millis.saturating_add(driven)
    }

    fn every(&self, period: Duration, callback: TimerCallback) -> TimerHandle {
        self.queue.every(period, callback)
    }

    fn after(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        self.queue.after(delay, callback)
    }
}
