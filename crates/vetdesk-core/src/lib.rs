//! VetDesk Core Library
//!
//! Operational state and validation for the veterinary front-office dashboard.
//!
//! # Architecture
//!
//! ```text
//!        UI surfaces (cards, dialogs, chat panels)
//!                         │
//!                         ▼
//!              ┌─────────────────────┐
//!              │  FrontDesk (FFI)    │
//!              └──────────┬──────────┘
//!        ┌────────────┬───┴────────┬──────────────┐
//!        ▼            ▼            ▼              ▼
//!  MetricsTracker  PatientLog  ChatSession    validators
//!        │            │            │
//!        │            │            └──► IntentEngine (vetdesk-assistant)
//!        └─────┬──────┘
//!              ▼
//!     Store (metrics:* / patientlog:*)      Clock (now, today, every, after)
//! ```
//!
//! # Core Principle
//!
//! **Nothing here is fatal.** Corrupt records fall back to defaults, invalid
//! fields produce per-field messages, and unknown chat input gets the default
//! reply.
//!
//! # Modules
//!
//! - [`clock`]: Clock trait, timer queue, manual and system clocks
//! - [`store`]: Durable key-value store trait with memory and SQLite adapters
//! - [`db`]: SQLite database layer
//! - [`models`]: Domain types (DailyMetrics, PatientLogEntry)
//! - [`tracker`]: Day-scoped metrics tracker and patient log
//! - [`validation`]: National ID, phone, email and form validation
//! - [`chat`]: Assistant chat session with deferred replies
//! - [`config`]: Host configuration

pub mod chat;
pub mod clock;
pub mod config;
pub mod db;
pub mod models;
pub mod store;
pub mod tracker;
pub mod validation;

// Re-export commonly used types
pub use chat::{ChatMessage, ChatRole, ChatSession};
pub use clock::{Clock, ManualClock, SystemClock, TimerHandle};
pub use config::DeskConfig;
pub use models::{DailyMetrics, NewPatientEntry, PatientLogEntry};
pub use store::{MemoryStore, SqliteStore, Store};
pub use tracker::{MetricsTracker, PatientLog};
pub use vetdesk_assistant::{IntentEngine, Priority, Reply};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FrontDeskError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<store::StoreError> for FrontDeskError {
    fn from(e: store::StoreError) -> Self {
        FrontDeskError::StorageError(e.to_string())
    }
}

impl From<config::ConfigError> for FrontDeskError {
    fn from(e: config::ConfigError) -> Self {
        FrontDeskError::ConfigError(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a front desk persisted at the given path.
#[uniffi::export]
pub fn open_front_desk(path: String) -> Result<Arc<FrontDesk>, FrontDeskError> {
    let store = SqliteStore::open(&path)?;
    Ok(Arc::new(FrontDesk::new(
        Arc::new(store),
        Arc::new(SystemClock::new()),
        DeskConfig::default(),
    )))
}

/// Open a front desk from a JSON config file.
///
/// Uses an in-memory store when the config has no `database_path`, and the
/// built-in intent rules when it has no `rules_path`.
#[uniffi::export]
pub fn open_front_desk_from_config(config_path: String) -> Result<Arc<FrontDesk>, FrontDeskError> {
    let config = DeskConfig::from_path(&config_path)?;
    let engine = config.load_engine()?;
    let store: Arc<dyn Store> = match &config.database_path {
        Some(path) => Arc::new(SqliteStore::open(path)?),
        None => Arc::new(SqliteStore::open_in_memory()?),
    };
    let clock = Arc::new(SystemClock::new());
    let mut desk = FrontDesk::with_engine(store, clock.clone(), config, engine);
    desk.system_clock = Some(clock);
    Ok(Arc::new(desk))
}

/// Create a front desk over an in-memory database (for testing).
#[uniffi::export]
pub fn open_front_desk_in_memory() -> Result<Arc<FrontDesk>, FrontDeskError> {
    let store = SqliteStore::open_in_memory()?;
    Ok(Arc::new(FrontDesk::new(
        Arc::new(store),
        Arc::new(SystemClock::new()),
        DeskConfig::default(),
    )))
}

// =========================================================================
// Validation (exported to FFI)
// =========================================================================

#[uniffi::export]
pub fn validate_national_id(id: String) -> bool {
    validation::validate_national_id(&id)
}

#[uniffi::export]
pub fn validate_phone(phone: String) -> bool {
    validation::validate_phone(&phone)
}

#[uniffi::export]
pub fn validate_email(email: String) -> bool {
    validation::validate_email(&email)
}

/// Validate the owner form; submit is enabled only when `can_submit` is true.
#[uniffi::export]
pub fn validate_owner_form(form: FfiOwnerForm) -> FfiFormReport {
    let form: validation::OwnerForm = form.into();
    form.validate().into()
}

// =========================================================================
// Main API Object
// =========================================================================

/// All day-scoped state behind the dashboard.
#[derive(uniffi::Object)]
pub struct FrontDesk {
    system_clock: Option<Arc<SystemClock>>,
    metrics: MetricsTracker,
    patient_log: PatientLog,
    engine: Arc<IntentEngine>,
    chat: ChatSession,
}

impl FrontDesk {
    /// Wire trackers to a store and the system clock.
    pub fn new(store: Arc<dyn Store>, clock: Arc<SystemClock>, config: DeskConfig) -> Self {
        let mut desk = Self::with_clock(store, clock.clone(), config);
        desk.system_clock = Some(clock);
        desk
    }

    /// Wire trackers to any clock. `pump` is a no-op unless the clock is a
    /// [`SystemClock`] passed through [`FrontDesk::new`].
    pub fn with_clock(store: Arc<dyn Store>, clock: Arc<dyn Clock>, config: DeskConfig) -> Self {
        Self::with_engine(store, clock, config, IntentEngine::new())
    }

    /// Wire trackers to any clock, answering chat with `engine`.
    pub fn with_engine(
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        config: DeskConfig,
        engine: IntentEngine,
    ) -> Self {
        let engine = Arc::new(engine);
        Self {
            system_clock: None,
            metrics: MetricsTracker::new(store.clone(), clock.clone(), &config),
            patient_log: PatientLog::new(store, clock.clone()),
            chat: ChatSession::with_history_limit(
                engine.clone(),
                clock,
                config.reply_delay(),
                config.chat_history_limit,
            ),
            engine,
        }
    }

    pub fn metrics(&self) -> &MetricsTracker {
        &self.metrics
    }

    pub fn patient_log(&self) -> &PatientLog {
        &self.patient_log
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }
}

#[uniffi::export]
impl FrontDesk {
    // =========================================================================
    // Event Loop
    // =========================================================================

    /// Fire due timers. Call from the host's event loop.
    pub fn pump(&self) -> u32 {
        self.system_clock
            .as_ref()
            .map(|clock| u32::try_from(clock.pump()).unwrap_or(u32::MAX))
            .unwrap_or(0)
    }

    /// Everything the dashboard home screen shows.
    pub fn dashboard(&self) -> FfiDashboard {
        FfiDashboard {
            metrics: self.metrics.current().into(),
            timer_running: self.metrics.is_running(),
            recent_patients: self
                .patient_log
                .recent_default()
                .into_iter()
                .map(Into::into)
                .collect(),
            patient_count: self.patient_log.count() as u32,
        }
    }

    // =========================================================================
    // Metrics Operations
    // =========================================================================

    pub fn current_metrics(&self) -> FfiDailyMetrics {
        self.metrics.current().into()
    }

    pub fn start_timer(&self) {
        self.metrics.start_timer();
    }

    pub fn stop_timer(&self) {
        self.metrics.stop_timer();
    }

    pub fn is_timer_running(&self) -> bool {
        self.metrics.is_running()
    }

    pub fn increment_patients(&self) -> FfiDailyMetrics {
        self.metrics.increment_patients().into()
    }

    pub fn set_scheduled_appointments(&self, count: u32) -> FfiDailyMetrics {
        self.metrics.set_scheduled_appointments(count).into()
    }

    pub fn set_active_alerts(&self, count: u32) -> FfiDailyMetrics {
        self.metrics.set_active_alerts(count).into()
    }

    // =========================================================================
    // Patient Log Operations
    // =========================================================================

    /// Log a patient as seen now.
    pub fn add_patient(&self, patient: FfiNewPatient) -> FfiPatientEntry {
        self.patient_log.add_entry(patient.into()).into()
    }

    pub fn recent_patients(&self, limit: u32) -> Vec<FfiPatientEntry> {
        self.patient_log
            .recent(limit as usize)
            .into_iter()
            .map(Into::into)
            .collect()
    }

    pub fn patient_count(&self) -> u32 {
        self.patient_log.count() as u32
    }

    // =========================================================================
    // Assistant Operations
    // =========================================================================

    /// Classify text immediately, without the chat deferral.
    pub fn classify(&self, input: String) -> FfiReply {
        self.engine.classify(&input).into()
    }

    /// Post to the chat; the reply arrives after the configured delay.
    pub fn send_chat(&self, text: String) -> Option<FfiChatMessage> {
        self.chat.send(&text).map(Into::into)
    }

    pub fn chat_messages(&self) -> Vec<FfiChatMessage> {
        self.chat.messages().into_iter().map(Into::into).collect()
    }

    pub fn is_assistant_typing(&self) -> bool {
        self.chat.is_typing()
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe daily metrics.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDailyMetrics {
    pub day_key: String,
    pub consultation_seconds: u64,
    pub consultation_time: String,
    pub patients_attended: u32,
    pub scheduled_appointments: u32,
    pub active_alerts: u32,
}

impl From<DailyMetrics> for FfiDailyMetrics {
    fn from(metrics: DailyMetrics) -> Self {
        Self {
            consultation_time: metrics.consultation_time_display(),
            day_key: metrics.day_key,
            consultation_seconds: metrics.consultation_seconds,
            patients_attended: metrics.patients_attended,
            scheduled_appointments: metrics.scheduled_appointments,
            active_alerts: metrics.active_alerts,
        }
    }
}

/// FFI-safe new patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: String,
    pub owner: String,
    pub next_vaccine: String,
    pub urgent: bool,
}

impl From<FfiNewPatient> for NewPatientEntry {
    fn from(patient: FfiNewPatient) -> Self {
        NewPatientEntry {
            name: patient.name,
            species: patient.species,
            breed: patient.breed,
            age: patient.age,
            owner: patient.owner,
            next_vaccine: patient.next_vaccine,
            urgent: patient.urgent,
        }
    }
}

/// FFI-safe patient log entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientEntry {
    pub id: String,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: String,
    pub owner: String,
    pub last_visit: String,
    pub next_vaccine: String,
    pub urgent: bool,
    pub timestamp: i64,
}

impl From<PatientLogEntry> for FfiPatientEntry {
    fn from(entry: PatientLogEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            species: entry.species,
            breed: entry.breed,
            age: entry.age,
            owner: entry.owner,
            last_visit: entry.last_visit,
            next_vaccine: entry.next_vaccine,
            urgent: entry.urgent,
            timestamp: entry.timestamp,
        }
    }
}

/// FFI-safe dashboard snapshot.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDashboard {
    pub metrics: FfiDailyMetrics,
    pub timer_running: bool,
    pub recent_patients: Vec<FfiPatientEntry>,
    pub patient_count: u32,
}

/// FFI-safe assistant reply.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReply {
    pub content: String,
    /// "urgent", "normal" or "info"
    pub priority: String,
}

impl From<Reply> for FfiReply {
    fn from(reply: Reply) -> Self {
        Self {
            priority: reply.priority.as_str().to_string(),
            content: reply.content,
        }
    }
}

/// FFI-safe chat message.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiChatMessage {
    pub id: String,
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
    pub priority: Option<String>,
    pub timestamp: i64,
}

impl From<ChatMessage> for FfiChatMessage {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            role: match message.role {
                ChatRole::User => "user".to_string(),
                ChatRole::Assistant => "assistant".to_string(),
            },
            content: message.content,
            priority: message.priority.map(|p| p.as_str().to_string()),
            timestamp: message.timestamp,
        }
    }
}

/// FFI-safe owner form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiOwnerForm {
    pub owner_name: String,
    pub national_id: String,
    pub phone: String,
    pub email: String,
}

impl From<FfiOwnerForm> for validation::OwnerForm {
    fn from(form: FfiOwnerForm) -> Self {
        validation::OwnerForm {
            owner_name: form.owner_name,
            national_id: form.national_id,
            phone: form.phone,
            email: form.email,
        }
    }
}

/// FFI-safe field error.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFieldError {
    /// "owner_name", "national_id", "phone" or "email"
    pub field: String,
    pub message: String,
}

/// FFI-safe form report.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFormReport {
    pub errors: Vec<FfiFieldError>,
    pub can_submit: bool,
}

impl From<validation::FormReport> for FfiFormReport {
    fn from(report: validation::FormReport) -> Self {
        Self {
            errors: report
                .errors
                .into_iter()
                .map(|(field, error)| FfiFieldError {
                    field: field_name(field).to_string(),
                    message: error.to_string(),
                })
                .collect(),
            can_submit: report.can_submit,
        }
    }
}

fn field_name(field: validation::FormField) -> &'static str {
    match field {
        validation::FormField::OwnerName => "owner_name",
        validation::FormField::NationalId => "national_id",
        validation::FormField::Phone => "phone",
        validation::FormField::Email => "email",
    }
}
