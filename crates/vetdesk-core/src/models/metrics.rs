//! Daily clinic metrics.

use serde::{Deserialize, Serialize};

/// Running counters for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyMetrics {
    /// Calendar day (YYYY-MM-DD) this record belongs to
    pub day_key: String,
    /// Seconds accumulated by the consultation timer
    pub consultation_seconds: u64,
    pub patients_attended: u32,
    pub scheduled_appointments: u32,
    pub active_alerts: u32,
}

impl DailyMetrics {
    /// Create a zeroed record for a day, seeding the alert count.
    pub fn new(day_key: String, default_active_alerts: u32) -> Self {
        Self {
            day_key,
            consultation_seconds: 0,
            patients_attended: 0,
            scheduled_appointments: 0,
            active_alerts: default_active_alerts,
        }
    }

    /// Store key for a day's metrics.
    pub fn storage_key(day_key: &str) -> String {
        format!("metrics:{}", day_key)
    }

    /// Consultation time as HH:MM:SS.
    pub fn consultation_time_display(&self) -> String {
        let total = self.consultation_seconds;
        format!(
            "{:02}:{:02}:{:02}",
            total / 3600,
            (total % 3600) / 60,
            total % 60
        )
    }
}
