//! Cooperative timer queue shared by the clock implementations.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use super::{TimerCallback, TimerHandle, TimerId};

/// Smallest period accepted for repeating timers.
const MIN_PERIOD: Duration = Duration::from_millis(1);

struct Timer {
    due: Duration,
    period: Option<Duration>,
    /// Taken out while the callback runs
    callback: Option<TimerCallback>,
}

#[derive(Default)]
struct QueueState {
    elapsed: Duration,
    next_id: TimerId,
    timers: BTreeMap<TimerId, Timer>,
}

/// Timers ordered by due time, then registration order.
///
/// Callbacks run without the queue lock held, so they may register new
/// timers or cancel any timer, including their own.
#[derive(Clone, Default)]
pub struct TimerQueue {
    state: Arc<Mutex<QueueState>>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time the queue has been driven to.
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    /// Number of scheduled timers.
    pub fn pending(&self) -> usize {
        self.lock().timers.len()
    }

    pub fn every(&self, period: Duration, callback: TimerCallback) -> TimerHandle {
        let period = period.max(MIN_PERIOD);
        self.schedule(period, Some(period), callback)
    }

    pub fn after(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        self.schedule(delay, None, callback)
    }

    fn schedule(
        &self,
        delay: Duration,
        period: Option<Duration>,
        callback: TimerCallback,
    ) -> TimerHandle {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        let due = state.elapsed + delay;
        state.timers.insert(
            id,
            Timer {
                due,
                period,
                callback: Some(callback),
            },
        );
        drop(state);

        let weak: Weak<Mutex<QueueState>> = Arc::downgrade(&self.state);
        TimerHandle::new(id, move |id| {
            if let Some(state) = weak.upgrade() {
                let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
                state.timers.remove(&id);
            }
        })
    }

    /// Fire every timer due at or before `target`, in order.
    ///
    /// `on_fire` observes each due instant before its callback runs. Returns
    /// the number of callbacks invoked.
    pub fn run_until(&self, target: Duration, mut on_fire: impl FnMut(Duration)) -> usize {
        let mut fired = 0;

        loop {
            let mut state = self.lock();
            let next = state
                .timers
                .iter()
                .filter(|(_, timer)| timer.callback.is_some() && timer.due <= target)
                .min_by_key(|(id, timer)| (timer.due, **id))
                .map(|(id, _)| *id);

            let Some(id) = next else {
                if target > state.elapsed {
                    state.elapsed = target;
                }
                break;
            };

            let (due, mut callback) = match state.timers.get_mut(&id) {
                Some(timer) => match timer.callback.take() {
                    Some(callback) => (timer.due, callback),
                    None => continue,
                },
                None => continue,
            };
            state.elapsed = due;
            if state.timers.get(&id).map(|t| t.period.is_none()).unwrap_or(false) {
                state.timers.remove(&id);
            }
            drop(state);

            on_fire(due);
            callback();
            fired += 1;

            let mut state = self.lock();
            if let Some(timer) = state.timers.get_mut(&id) {
                if let Some(period) = timer.period {
                    timer.due += period;
                    timer.callback = Some(callback);
                }
            }
        }

        fired
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // Callbacks run outside the lock, so a poisoned queue only means a
        // panic happened between bookkeeping steps; the map stays consistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
