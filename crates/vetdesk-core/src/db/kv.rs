//! Key-value database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};

impl Database {
    /// Get the value stored under a key.
    pub fn get_value(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Insert or replace the value under a key.
    pub fn set_value(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// Delete a key. Returns whether a row was removed.
    pub fn remove_value(&self, key: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?", [key])?;
        Ok(rows_affected > 0)
    }

    /// List keys starting with a prefix, sorted.
    pub fn list_keys(&self, prefix: &str) -> DbResult<Vec<String>> {
        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
        let mut stmt = self.conn.prepare(
            r#"
            SELECT key FROM kv_store
            WHERE key LIKE ? ESCAPE '\'
            ORDER BY key
            "#,
        )?;

        let rows = stmt.query_map([pattern], |row| row.get(0))?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
