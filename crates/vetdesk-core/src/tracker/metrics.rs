//! Daily metrics and the consultation timer.

use std::sync::{Arc, Mutex, Weak};

use tracing::{debug, info, warn};

use super::lock_state;
use crate::clock::{Clock, TimerHandle};
use crate::config::{DeskConfig, ROLLOVER_POLL, TIMER_TICK};
use crate::models::DailyMetrics;
use crate::store::{load_json, save_json, Loaded, Store};

/// Consultation timer state.
#[derive(Debug)]
enum TimerState {
    Idle,
    Running(TimerHandle),
}

struct MetricsState {
    metrics: DailyMetrics,
    timer: TimerState,
}

struct Shared {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    default_active_alerts: u32,
    state: Mutex<MetricsState>,
}

/// Owns today's [`DailyMetrics`] and the consultation timer.
///
/// ```text
/// Idle ──start_timer──► Running ──stop_timer──► Idle
///                          │
///                          └──day rollover (forced)──► Idle
/// ```
pub struct MetricsTracker {
    shared: Arc<Shared>,
    poll: Option<TimerHandle>,
}

impl MetricsTracker {
    /// Load today's record (or create it) and start the day-boundary poll.
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, config: &DeskConfig) -> Self {
        let day_key = clock.today();
        let metrics = load_or_init(store.as_ref(), &day_key, config.default_active_alerts);

        let shared = Arc::new(Shared {
            store,
            clock,
            default_active_alerts: config.default_active_alerts,
            state: Mutex::new(MetricsState {
                metrics,
                timer: TimerState::Idle,
            }),
        });

        let weak = Arc::downgrade(&shared);
        let poll = shared.clock.every(
            ROLLOVER_POLL,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.check_rollover();
                }
            }),
        );

        Self {
            shared,
            poll: Some(poll),
        }
    }

    /// Today's metrics. Rolls over first if the day has changed.
    pub fn current(&self) -> DailyMetrics {
        let mut state = lock_state(&self.shared.state);
        self.shared.roll_if_needed(&mut state);
        state.metrics.clone()
    }

    /// Start accumulating consultation seconds. No-op while running.
    pub fn start_timer(&self) {
        let mut state = lock_state(&self.shared.state);
        self.shared.roll_if_needed(&mut state);
        if matches!(state.timer, TimerState::Running(_)) {
            return;
        }

        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let handle = self.shared.clock.every(
            TIMER_TICK,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.tick();
                }
            }),
        );
        state.timer = TimerState::Running(handle);
        info!(day = %state.metrics.day_key, "consultation timer started");
    }

    /// Stop the timer, keeping the accumulated value. No-op while idle.
    pub fn stop_timer(&self) {
        let mut state = lock_state(&self.shared.state);
        if let TimerState::Running(handle) = std::mem::replace(&mut state.timer, TimerState::Idle) {
            handle.cancel();
            info!(
                seconds = state.metrics.consultation_seconds,
                "consultation timer stopped"
            );
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(
            lock_state(&self.shared.state).timer,
            TimerState::Running(_)
        )
    }

    /// Record one more attended patient.
    pub fn increment_patients(&self) -> DailyMetrics {
        self.shared
            .mutate(|m| m.patients_attended = m.patients_attended.saturating_add(1))
    }

    pub fn set_scheduled_appointments(&self, count: u32) -> DailyMetrics {
        self.shared.mutate(|m| m.scheduled_appointments = count)
    }

    pub fn set_active_alerts(&self, count: u32) -> DailyMetrics {
        self.shared.mutate(|m| m.active_alerts = count)
    }

    /// Raise one alert.
    pub fn increment_alerts(&self) -> DailyMetrics {
        self.shared
            .mutate(|m| m.active_alerts = m.active_alerts.saturating_add(1))
    }

    /// Resolve one alert; stays at zero.
    pub fn resolve_alert(&self) -> DailyMetrics {
        self.shared
            .mutate(|m| m.active_alerts = m.active_alerts.saturating_sub(1))
    }

    /// Run the day-boundary check now. Returns whether a rollover happened.
    pub fn check_rollover(&self) -> bool {
        self.shared.check_rollover()
    }
}

impl Drop for MetricsTracker {
    fn drop(&mut self) {
        if let Some(poll) = self.poll.take() {
            poll.cancel();
        }
        self.stop_timer();
    }
}

impl Shared {
    fn check_rollover(&self) -> bool {
        let mut state = lock_state(&self.state);
        self.roll_if_needed(&mut state)
    }

    /// Switch to the clock's day if it differs from the current one.
    ///
    /// The record already stored for that day (the clock was set back, or
    /// another desk shares the store) is resumed, never overwritten.
    fn roll_if_needed(&self, state: &mut MetricsState) -> bool {
        let today = self.clock.today();
        if today == state.metrics.day_key {
            return false;
        }

        if let TimerState::Running(handle) = std::mem::replace(&mut state.timer, TimerState::Idle) {
            handle.cancel();
        }

        info!(
            from = %state.metrics.day_key,
            to = %today,
            "day rollover: switching metrics"
        );
        state.metrics = load_or_init(self.store.as_ref(), &today, self.default_active_alerts);
        true
    }

    fn tick(&self) {
        let mut state = lock_state(&self.state);
        // A stale tick from the previous day must not touch the new record.
        if self.roll_if_needed(&mut state) {
            return;
        }
        if !matches!(state.timer, TimerState::Running(_)) {
            return;
        }

        state.metrics.consultation_seconds += 1;
        self.persist(&state.metrics);
        debug!(
            seconds = state.metrics.consultation_seconds,
            "consultation tick"
        );
    }

    fn mutate(&self, apply: impl FnOnce(&mut DailyMetrics)) -> DailyMetrics {
        let mut state = lock_state(&self.state);
        self.roll_if_needed(&mut state);
        apply(&mut state.metrics);
        self.persist(&state.metrics);
        state.metrics.clone()
    }

    fn persist(&self, metrics: &DailyMetrics) {
        let key = DailyMetrics::storage_key(&metrics.day_key);
        if let Err(e) = save_json(self.store.as_ref(), &key, metrics) {
            warn!(key = %key, error = %e, "failed to persist metrics");
        }
    }
}

/// Load a day's record, creating and persisting a zeroed one when absent.
fn load_or_init(store: &dyn Store, day_key: &str, default_active_alerts: u32) -> DailyMetrics {
    let key = DailyMetrics::storage_key(day_key);

    match load_json::<DailyMetrics>(store, &key) {
        Ok(Loaded::Found(metrics)) if metrics.day_key == day_key => {
            debug!(key = %key, "loaded metrics");
            return metrics;
        }
        Ok(Loaded::Found(metrics)) => {
            warn!(key = %key, stored = %metrics.day_key, "stored metrics belong to another day");
        }
        Ok(Loaded::Corrupt) | Ok(Loaded::Missing) => {}
        Err(e) => {
            // Leave the store alone; it may hold a good record we could not read.
            warn!(key = %key, error = %e, "failed to read metrics");
            return DailyMetrics::new(day_key.to_string(), default_active_alerts);
        }
    }

    let metrics = DailyMetrics::new(day_key.to_string(), default_active_alerts);
    if let Err(e) = save_json(store, &key, &metrics) {
        warn!(key = %key, error = %e, "failed to persist metrics");
    }
    metrics
}
