//! Recency-bounded log of patients seen today.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use super::lock_state;
use crate::clock::{Clock, TimerHandle};
use crate::config::{DEFAULT_RECENT_LIMIT, PATIENT_LOG_CAPACITY, ROLLOVER_POLL};
use crate::models::{NewPatientEntry, PatientLogEntry};
use crate::store::{load_json, save_json, Loaded, Store};

/// Format of the visit time stamped on each entry.
const LAST_VISIT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Day whose list is currently stored, so a restart can discard it.
pub const CURRENT_DAY_KEY: &str = "patientlog:current-day";

struct LogState {
    day_key: String,
    /// Newest first, at most `PATIENT_LOG_CAPACITY`
    entries: Vec<PatientLogEntry>,
}

struct Shared {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    state: Mutex<LogState>,
}

/// Today's most recently seen patients.
pub struct PatientLog {
    shared: Arc<Shared>,
    poll: Option<TimerHandle>,
}

impl PatientLog {
    /// Load today's log and start the day-boundary poll.
    ///
    /// A list left behind by a previous day (the app was closed over
    /// midnight) is removed first.
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        let day_key = clock.today();
        discard_stale_day(store.as_ref(), &day_key);
        let entries = load_entries(store.as_ref(), &day_key);

        let shared = Arc::new(Shared {
            store,
            clock,
            state: Mutex::new(LogState { day_key, entries }),
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

    /// Record a patient as seen now. The oldest entry beyond capacity is dropped.
    pub fn add_entry(&self, new: NewPatientEntry) -> PatientLogEntry {
        let mut state = lock_state(&self.shared.state);
        self.shared.roll_if_needed(&mut state);

        let now = self.shared.clock.now();
        let entry = new.into_entry(
            now.format(LAST_VISIT_FORMAT).to_string(),
            self.shared.clock.now_millis(),
        );

        // Insertion order is the recency order; timestamps never reorder it.
        state.entries.insert(0, entry.clone());
        state.entries.truncate(PATIENT_LOG_CAPACITY);
        self.shared.persist(&state);

        debug!(id = %entry.id, name = %entry.name, "patient logged");
        entry
    }

    /// Up to `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<PatientLogEntry> {
        lock_state(&self.shared.state)
            .entries
            .iter()
            .take(limit)
            .cloned()
            .collect()
    }

    /// The five newest entries.
    pub fn recent_default(&self) -> Vec<PatientLogEntry> {
        self.recent(DEFAULT_RECENT_LIMIT)
    }

    pub fn count(&self) -> usize {
        lock_state(&self.shared.state).entries.len()
    }

    /// Day the log currently belongs to.
    pub fn day_key(&self) -> String {
        lock_state(&self.shared.state).day_key.clone()
    }

    /// Run the day-boundary check now. Returns whether the log was reset.
    pub fn check_rollover(&self) -> bool {
        self.shared.check_rollover()
    }
}

impl Drop for PatientLog {
    fn drop(&mut self) {
        if let Some(poll) = self.poll.take() {
            poll.cancel();
        }
    }
}

impl Shared {
    fn check_rollover(&self) -> bool {
        let mut state = lock_state(&self.state);
        self.roll_if_needed(&mut state)
    }

    /// Empty the log and drop the previous day's stored list.
    fn roll_if_needed(&self, state: &mut LogState) -> bool {
        let today = self.clock.today();
        if today == state.day_key {
            return false;
        }

        let old_key = PatientLogEntry::storage_key(&state.day_key);
        if let Err(e) = self.store.remove(&old_key) {
            warn!(key = %old_key, error = %e, "failed to remove previous patient log");
        }

        info!(
            from = %state.day_key,
            to = %today,
            discarded = state.entries.len(),
            "day rollover: patient log cleared"
        );
        state.day_key = today;
        state.entries.clear();
        self.persist(state);
        mark_current_day(self.store.as_ref(), &state.day_key);
        true
    }

    fn persist(&self, state: &LogState) {
        let key = PatientLogEntry::storage_key(&state.day_key);
        if let Err(e) = save_json(self.store.as_ref(), &key, &state.entries) {
            warn!(key = %key, error = %e, "failed to persist patient log");
        }
    }
}

/// Remove the list of the marked day if it is not `today`, then mark `today`.
fn discard_stale_day(store: &dyn Store, today: &str) {
    match store.get(CURRENT_DAY_KEY) {
        Ok(Some(marked)) if marked == today => return,
        Ok(Some(marked)) => {
            let old_key = PatientLogEntry::storage_key(&marked);
            match store.remove(&old_key) {
                Ok(_) => info!(
                    from = %marked,
                    to = %today,
                    "discarded patient log of a previous day"
                ),
                Err(e) => warn!(
                    key = %old_key,
                    error = %e,
                    "failed to remove previous patient log"
                ),
            }
        }
        Ok(None) => {}
        Err(e) => {
            warn!(key = CURRENT_DAY_KEY, error = %e, "failed to read patient log day marker");
            return;
        }
    }
    mark_current_day(store, today);
}

fn mark_current_day(store: &dyn Store, day_key: &str) {
    if let Err(e) = store.set(CURRENT_DAY_KEY, day_key) {
        warn!(key = CURRENT_DAY_KEY, error = %e, "failed to persist patient log day marker");
    }
}

/// Read a day's log; anything unreadable counts as empty.
fn load_entries(store: &dyn Store, day_key: &str) -> Vec<PatientLogEntry> {
    let key = PatientLogEntry::storage_key(day_key);

    match load_json::<Vec<PatientLogEntry>>(store, &key) {
        Ok(Loaded::Found(mut entries)) => {
            entries.truncate(PATIENT_LOG_CAPACITY);
            entries
        }
        Ok(Loaded::Missing) | Ok(Loaded::Corrupt) => Vec::new(),
        Err(e) => {
            warn!(key = %key, error = %e, "failed to read patient log");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn setup() -> (Arc<MemoryStore>, Arc<ManualClock>, PatientLog) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::at(2024, 11, 20, 9, 0, 0));
        let log = PatientLog::new(store.clone(), clock.clone());
        (store, clock, log)
    }

    #[test]
    fn test_add_entry_stamps_from_clock() {
        let (_store, clock, log) = setup();
        clock.advance(Duration::from_secs(15 * 60));

        let entry = log.add_entry(NewPatientEntry::new("Luna", "Gato"));
        assert_eq!(entry.last_visit, "2024-11-20 09:15");
        assert_eq!(entry.timestamp, clock.now_millis());
        assert_eq!(log.count(), 1);
    }

    #[test]
    fn test_capacity_keeps_newest() {
        let (_store, clock, log) = setup();

        for i in 0..12 {
            log.add_entry(NewPatientEntry::new(format!("P{}", i), "Perro"));
            clock.advance(Duration::from_secs(1));
        }

        let names: Vec<String> = log.recent(20).into_iter().map(|e| e.name).collect();
        let expected: Vec<String> = (2..12).rev().map(|i| format!("P{}", i)).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_same_instant_keeps_insertion_order() {
        let (_store, _clock, log) = setup();

        log.add_entry(NewPatientEntry::new("First", "Perro"));
        log.add_entry(NewPatientEntry::new("Second", "Perro"));

        let names: Vec<String> = log.recent(5).into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[test]
    fn test_wall_clock_set_back_keeps_newest_first() {
        let (_store, clock, log) = setup();
        // 01:30 local time
        clock.set_now(clock.now() - chrono::Duration::minutes(450));

        for i in 0..10 {
            log.add_entry(NewPatientEntry::new(format!("P{}", i), "Perro"));
            clock.advance(Duration::from_secs(60));
        }
        // End of daylight saving time: 01:40 becomes 01:05 again
        clock.set_now(clock.now() - chrono::Duration::minutes(35));
        let newest = log.add_entry(NewPatientEntry::new("Newest", "Gato"));

        let recent = log.recent(20);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0], newest);
        assert_eq!(recent[1].name, "P9");
        assert_eq!(recent[9].name, "P1");
        assert!(recent.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn test_day_marker_tracks_rollover() {
        let (store, clock, log) = setup();
        assert_eq!(store.get(CURRENT_DAY_KEY).unwrap(), Some("2024-11-20".to_string()));

        clock.set_now(clock.now() + chrono::Duration::days(1));
        assert!(log.check_rollover());
        assert_eq!(store.get(CURRENT_DAY_KEY).unwrap(), Some("2024-11-21".to_string()));
    }

    #[test]
    fn test_recent_default_limit() {
        let (_store, _clock, log) = setup();
        for i in 0..7 {
            log.add_entry(NewPatientEntry::new(format!("P{}", i), "Gato"));
        }

        assert_eq!(log.recent_default().len(), 5);
        assert_eq!(log.recent(0).len(), 0);
        assert_eq!(log.count(), 7);
    }

    #[test]
    fn test_corrupt_log_is_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set("patientlog:2024-11-20", "[{").unwrap();
        let clock = Arc::new(ManualClock::at(2024, 11, 20, 9, 0, 0));

        let log = PatientLog::new(store, clock);
        assert_eq!(log.count(), 0);
    }

    #[test]
    fn test_persisted_under_day_key() {
        let (store, _clock, log) = setup();
        let entry = log.add_entry(NewPatientEntry::new("Rocky", "Perro"));

        let raw = store.get("patientlog:2024-11-20").unwrap().unwrap();
        let stored: Vec<PatientLogEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, vec![entry]);
    }
}
