//! Patient log integration tests.

use std::sync::Arc;
use std::time::Duration;

use vetdesk_core::clock::ManualClock;
use vetdesk_core::models::{NewPatientEntry, PatientLogEntry};
use vetdesk_core::store::{MemoryStore, SqliteStore, Store};
use vetdesk_core::tracker::{PatientLog, CURRENT_DAY_KEY};

fn patient(name: &str, species: &str, owner: &str) -> NewPatientEntry {
    NewPatientEntry {
        name: name.to_string(),
        species: species.to_string(),
        breed: "Mestizo".to_string(),
        age: "4 años".to_string(),
        owner: owner.to_string(),
        next_vaccine: "2025-02-01".to_string(),
        urgent: false,
    }
}

#[test]
fn test_twelve_inserts_keep_ten_newest_first() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::at(2024, 11, 20, 8, 0, 0));
    let log = PatientLog::new(store, clock.clone());

    let mut inserted = Vec::new();
    for i in 0..12 {
        inserted.push(log.add_entry(patient(&format!("Paciente {}", i), "Perro", "Ana")));
        clock.advance(Duration::from_secs(30));
    }

    let recent = log.recent(20);
    assert_eq!(recent.len(), 10);
    assert_eq!(log.count(), 10);

    let expected: Vec<PatientLogEntry> = inserted.into_iter().rev().take(10).collect();
    assert_eq!(recent, expected);
}

#[test]
fn test_rollover_clears_and_removes_previous_day() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::at(2024, 11, 20, 23, 59, 0));
    let log = PatientLog::new(store.clone(), clock.clone());

    log.add_entry(patient("Luna", "Gato", "María"));
    assert!(store.get("patientlog:2024-11-20").unwrap().is_some());

    clock.advance(Duration::from_secs(60));

    assert_eq!(log.count(), 0);
    assert_eq!(log.day_key(), "2024-11-21");
    assert_eq!(store.get("patientlog:2024-11-20").unwrap(), None);
    assert_eq!(
        store.get("patientlog:2024-11-21").unwrap(),
        Some("[]".to_string())
    );
}

#[test]
fn test_add_after_midnight_starts_new_day_without_poll() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::at(2024, 11, 20, 23, 59, 50));
    let log = PatientLog::new(store.clone(), clock.clone());

    log.add_entry(patient("Rocky", "Perro", "Luis"));
    // Poll not due yet, but the clock has crossed midnight
    clock.advance(Duration::from_secs(20));

    let entry = log.add_entry(patient("Kira", "Gato", "Sofía"));
    assert_eq!(entry.last_visit, "2024-11-21 00:00");
    assert_eq!(log.recent(10), vec![entry]);
    assert_eq!(store.get("patientlog:2024-11-20").unwrap(), None);
}

#[test]
fn test_recent_does_not_mutate() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::at(2024, 11, 20, 10, 0, 0));
    let log = PatientLog::new(store.clone(), clock);

    log.add_entry(patient("Toby", "Perro", "Carla"));
    let before = store.get("patientlog:2024-11-20").unwrap();

    let _ = log.recent(3);
    let _ = log.recent_default();

    assert_eq!(store.get("patientlog:2024-11-20").unwrap(), before);
    assert_eq!(log.count(), 1);
}

#[test]
fn test_round_trip_through_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("desk.db");
    let clock = Arc::new(ManualClock::at(2024, 11, 20, 10, 0, 0));

    let written = {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let log = PatientLog::new(store, clock.clone());
        let mut urgent = patient("Nala", "Gato", "Pedro");
        urgent.urgent = true;
        log.add_entry(patient("Simba", "Gato", "Pedro"));
        clock.advance(Duration::from_secs(5));
        log.add_entry(urgent);
        log.recent(10)
    };

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let log = PatientLog::new(store, clock);
    assert_eq!(log.recent(10), written);
    assert!(written[0].urgent);
}

#[test]
fn test_restart_after_midnight_discards_previous_day() {
    let store = Arc::new(MemoryStore::new());
    {
        let clock = Arc::new(ManualClock::at(2024, 11, 20, 19, 0, 0));
        let log = PatientLog::new(store.clone(), clock);
        log.add_entry(patient("Luna", "Gato", "María"));
    }

    // Closed overnight; no instance saw midnight
    let clock = Arc::new(ManualClock::at(2024, 11, 21, 8, 0, 0));
    let log = PatientLog::new(store.clone(), clock);
    assert_eq!(log.count(), 0);
    log.add_entry(patient("Max", "Perro", "Jorge"));

    assert_eq!(
        store.keys().unwrap(),
        vec!["patientlog:2024-11-21", "patientlog:current-day"]
    );
    assert_eq!(
        store.get(CURRENT_DAY_KEY).unwrap(),
        Some("2024-11-21".to_string())
    );
}

#[test]
fn test_restart_same_day_keeps_log_in_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("desk.db");

    {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let log = PatientLog::new(store, Arc::new(ManualClock::at(2024, 11, 20, 9, 0, 0)));
        log.add_entry(patient("Coco", "Perro", "Elena"));
    }
    {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let log = PatientLog::new(store, Arc::new(ManualClock::at(2024, 11, 20, 17, 0, 0)));
        assert_eq!(log.count(), 1);
    }

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let log = PatientLog::new(store.clone(), Arc::new(ManualClock::at(2024, 11, 22, 9, 0, 0)));
    assert_eq!(log.count(), 0);
    assert_eq!(
        store.keys_with_prefix("patientlog:2").unwrap(),
        vec!["patientlog:2024-11-22"]
    );
}
