//! SQLite schema definition.

/// Key-value schema used by the durable store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Key-Value Store
-- ============================================================================
-- Keys are namespaced by tracker: 'metrics:YYYY-MM-DD', 'patientlog:YYYY-MM-DD'

CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                          -- JSON document
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
