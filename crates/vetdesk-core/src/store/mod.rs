//! Durable key-value store abstraction.
//!
//! Both trackers persist through a [`Store`] under disjoint key namespaces
//! (`metrics:*` and `patientlog:*`), so no cross-tracker coordination is
//! needed.

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Lock poisoned: {0}")]
    Poisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        StoreError::Poisoned(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// String key-value persistence consumed by the trackers.
pub trait Store: Send + Sync {
    /// Read the value under `key`, if any.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Outcome of reading a typed record.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    Found(T),
    Missing,
    /// The stored value exists but does not parse
    Corrupt,
}

/// Read and deserialize a JSON record.
pub fn load_json<T: DeserializeOwned>(store: &dyn Store, key: &str) -> StoreResult<Loaded<T>> {
    match store.get(key)? {
        None => Ok(Loaded::Missing),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Ok(Loaded::Found(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored record is unparsable");
                Ok(Loaded::Corrupt)
            }
        },
    }
}

/// Serialize and write a JSON record.
pub fn save_json<T: Serialize>(store: &dyn Store, key: &str, value: &T) -> StoreResult<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}
