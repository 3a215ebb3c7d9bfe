//! SQLite-backed store.

use std::path::Path;
use std::sync::Mutex;

use super::{Store, StoreResult};
use crate::db::Database;

/// Durable store over the `kv_store` table.
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    /// Open or create the database file.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Ok(Self::from_database(Database::open(path)?))
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::from_database(Database::open_in_memory()?))
    }

    pub fn from_database(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Keys starting with a prefix, sorted (e.g. the metrics archive).
    pub fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let db = self.db.lock()?;
        Ok(db.list_keys(prefix)?)
    }
}

impl Store for SqliteStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let db = self.db.lock()?;
        Ok(db.get_value(key)?)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let db = self.db.lock()?;
        db.set_value(key, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let db = self.db.lock()?;
        db.remove_value(key)?;
        Ok(())
    }
}
