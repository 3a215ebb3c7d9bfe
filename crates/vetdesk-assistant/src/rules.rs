//! Built-in intent rules for the front-office assistant.
//!
//! Rules are scanned in order and the first match wins, so the most urgent
//! and most specific topics come first.

use serde::{Deserialize, Serialize};

/// Reply priority shown as a badge next to the assistant message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    Normal,
    Info,
}

impl Priority {
    /// Lowercase label used by hosts and persisted chat history.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::Normal => "normal",
            Priority::Info => "info",
        }
    }
}

/// A keyword-to-response mapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntentRule {
    /// Lowercase substrings; any one of them triggers the rule
    pub keywords: Vec<String>,
    pub priority: Priority,
    /// Reply text delivered when the rule matches
    pub response_template: String,
}

impl IntentRule {
    /// Create a rule from static keyword and template text.
    pub fn new(keywords: &[&str], priority: Priority, response_template: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            priority,
            response_template: response_template.to_string(),
        }
    }

    /// Check whether lowercased input contains any of the keywords.
    pub fn matches(&self, lowered_input: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && lowered_input.contains(k.as_str()))
    }
}

/// Reply used when no rule matches.
pub const DEFAULT_RESPONSE: &str = "Puedo ayudarte con: estado del inventario y stock, \
emergencias, citas y agenda del día, vacunas pendientes, pacientes e historiales, \
facturación y cobros, y horarios de atención. ¿Sobre qué tema necesitas información?";

/// Greeting shown when a chat surface opens.
pub const GREETING: &str = "Hola, soy el asistente de recepción. ¿En qué puedo ayudarte hoy?";

/// Default rule table, ordered most urgent and most specific first.
pub fn default_rules() -> Vec<IntentRule> {
    vec![
        // Inventory
        IntentRule::new(
            &["stock", "inventario", "existencias", "agotado", "reabastecer"],
            Priority::Urgent,
            "Alerta de inventario: hay 3 productos bajo el mínimo (vacuna antirrábica, \
             amoxicilina 250 mg y alimento renal felino). Se recomienda generar la orden \
             de compra hoy.",
        ),
        // Emergencies
        IntentRule::new(
            &["emergencia", "urgente", "urgencia", "accidente", "envenen"],
            Priority::Urgent,
            "Protocolo de emergencia: deriva al paciente a triaje inmediato, avisa al \
             veterinario de guardia y deja libre el consultorio 1.",
        ),
        // Appointments
        IntentRule::new(
            &["cita", "agenda", "turno"],
            Priority::Info,
            "Resumen de citas: la agenda de hoy tiene consultas programadas por la mañana \
             y por la tarde. Revisa el panel de citas para confirmar asistencia.",
        ),
        // Vaccines
        IntentRule::new(
            &["vacuna", "vacunación", "refuerzo", "desparasit"],
            Priority::Normal,
            "Vacunas pendientes: revisa la columna \"próxima vacuna\" del registro de \
             pacientes y envía recordatorios a los propietarios con refuerzos vencidos.",
        ),
        // Patients
        IntentRule::new(
            &["paciente", "historial", "mascota", "propietario"],
            Priority::Normal,
            "Pacientes: el registro del día muestra los últimos pacientes atendidos. \
             Abre la ficha para ver el historial clínico completo.",
        ),
        // Billing
        IntentRule::new(
            &["factura", "cobro", "pago", "caja", "precio"],
            Priority::Info,
            "Facturación: los cobros del día se registran en caja. Consulta el tarifario \
             vigente antes de emitir la factura.",
        ),
        // Opening hours
        IntentRule::new(
            &["horario", "abierto", "cierre", "apertura"],
            Priority::Info,
            "Horario de atención: lunes a viernes de 08:00 a 19:00 y sábados de 09:00 a \
             13:00. Emergencias con veterinario de guardia.",
        ),
    ]
}
