//! Front-desk configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use vetdesk_assistant::{rules_from_json, IntentEngine, RuleError};

/// Consultation timer tick.
pub const TIMER_TICK: Duration = Duration::from_secs(1);

/// Day-boundary poll period for both trackers.
pub const ROLLOVER_POLL: Duration = Duration::from_secs(60);

/// Maximum entries kept in the patient log.
pub const PATIENT_LOG_CAPACITY: usize = 10;

/// Entries returned by `recent_default`.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Chat messages kept per session unless configured otherwise.
pub const DEFAULT_CHAT_HISTORY_LIMIT: usize = 200;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rules error: {0}")]
    Rules(#[from] RuleError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings supplied by the host application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeskConfig {
    /// Alert count seeded into each new day's metrics
    pub default_active_alerts: u32,
    /// Delay before the assistant reply is delivered
    pub reply_delay_ms: u64,
    /// SQLite file; in-memory when absent
    pub database_path: Option<String>,
    /// JSON array of intent rules replacing the built-in table
    pub rules_path: Option<String>,
    /// Oldest chat messages beyond this count are dropped
    pub chat_history_limit: usize,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            default_active_alerts: 3,
            reply_delay_ms: 1000,
            database_path: None,
            rules_path: None,
            chat_history_limit: DEFAULT_CHAT_HISTORY_LIMIT,
        }
    }
}

impl DeskConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    /// Intent engine over `rules_path`, or the built-in rules when unset.
    pub fn load_engine(&self) -> ConfigResult<IntentEngine> {
        match &self.rules_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Ok(IntentEngine::with_rules(rules_from_json(&raw)?))
            }
            None => Ok(IntentEngine::new()),
        }
    }
}
