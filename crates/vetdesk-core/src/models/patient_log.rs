//! Patients seen today.

use serde::{Deserialize, Serialize};

/// A patient recorded in today's reception log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientLogEntry {
    /// UUID generated at insertion
    pub id: String,
    pub name: String,
    /// Species (e.g., "Perro", "Gato")
    pub species: String,
    pub breed: String,
    /// Free-text age as entered at reception (e.g., "3 años")
    pub age: String,
    /// Owner/client name
    pub owner: String,
    /// Local date and time of the visit
    pub last_visit: String,
    pub next_vaccine: String,
    #[serde(default)]
    pub urgent: bool,
    /// Insertion instant in milliseconds, used for ordering only
    pub timestamp: i64,
}

/// Fields supplied by the caller when a patient is seen.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewPatientEntry {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: String,
    pub owner: String,
    pub next_vaccine: String,
    #[serde(default)]
    pub urgent: bool,
}

impl NewPatientEntry {
    /// Create an entry with the identifying fields; the rest default to empty.
    pub fn new(name: impl Into<String>, species: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            species: species.into(),
            ..Default::default()
        }
    }

    /// Stamp the entry with its id, visit time and ordering timestamp.
    pub fn into_entry(self, last_visit: String, timestamp: i64) -> PatientLogEntry {
        PatientLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name,
            species: self.species,
            breed: self.breed,
            age: self.age,
            owner: self.owner,
            last_visit,
            next_vaccine: self.next_vaccine,
            urgent: self.urgent,
            timestamp,
        }
    }
}

impl PatientLogEntry {
    /// Store key for a day's log.
    pub fn storage_key(day_key: &str) -> String {
        format!("patientlog:{}", day_key)
    }
}
