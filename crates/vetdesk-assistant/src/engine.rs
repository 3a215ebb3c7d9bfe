//! Intent classification over the ordered rule table.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::{default_rules, IntentRule, Priority, DEFAULT_RESPONSE};

/// Rule loading errors.
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),
}

pub type RuleResult<T> = Result<T, RuleError>;

/// Assistant reply for a single operator message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    pub content: String,
    pub priority: Priority,
}

impl Reply {
    /// The fixed fallback reply.
    pub fn fallback() -> Self {
        Self {
            content: DEFAULT_RESPONSE.to_string(),
            priority: Priority::Info,
        }
    }
}

/// Deterministic keyword matcher. First matching rule wins.
#[derive(Debug, Clone)]
pub struct IntentEngine {
    rules: Vec<IntentRule>,
}

impl Default for IntentEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentEngine {
    /// Create an engine with the built-in front-office rules.
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Create an engine with a custom ordered rule table.
    pub fn with_rules(rules: Vec<IntentRule>) -> Self {
        Self { rules }
    }

    /// Classify operator input into a reply.
    pub fn classify(&self, input: &str) -> Reply {
        let lowered = input.to_lowercase();

        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| Reply {
                content: rule.response_template.clone(),
                priority: rule.priority,
            })
            .unwrap_or_else(Reply::fallback)
    }

    /// Append a rule after the existing ones (lowest precedence).
    pub fn add_rule(&mut self, rule: IntentRule) {
        self.rules.push(IntentRule {
            keywords: rule.keywords.iter().map(|k| k.to_lowercase()).collect(),
            ..rule
        });
    }

    /// Ordered rules, highest precedence first.
    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }
}

/// Parse a JSON array of rules supplied by the host.
///
/// Keywords are lowercased; a rule without any non-empty keyword is rejected.
pub fn rules_from_json(json: &str) -> RuleResult<Vec<IntentRule>> {
    let rules: Vec<IntentRule> = serde_json::from_str(json)?;

    rules
        .into_iter()
        .enumerate()
        .map(|(index, rule)| {
            let keywords: Vec<String> = rule
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
            if keywords.is_empty() {
                return Err(RuleError::InvalidRule(format!(
                    "rule {} has no keywords",
                    index
                )));
            }
            Ok(IntentRule { keywords, ..rule })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::GREETING;
    use proptest::prelude::*;

    #[test]
    fn test_stock_question_is_urgent() {
        let engine = IntentEngine::new();
        let reply = engine.classify("¿Cuál es el estado del stock?");
        assert_eq!(reply.priority, Priority::Urgent);
        assert!(reply.content.contains("inventario"));
    }

    #[test]
    fn test_appointments_summary_is_info() {
        let engine = IntentEngine::new();
        let reply = engine.classify("resumen de citas");
        assert_eq!(reply.priority, Priority::Info);
        assert!(reply.content.starts_with("Resumen de citas"));
    }

    #[test]
    fn test_unknown_text_falls_back() {
        let engine = IntentEngine::new();
        assert_eq!(engine.classify("xyz random text"), Reply::fallback());
    }

    #[test]
    fn test_empty_input_falls_back() {
        let engine = IntentEngine::new();
        assert_eq!(engine.classify(""), Reply::fallback());
        assert_eq!(engine.classify("   "), Reply::fallback());
    }

    #[test]
    fn test_case_insensitive() {
        let engine = IntentEngine::new();
        assert_eq!(engine.classify("VACUNA de Luna").priority, Priority::Normal);
    }

    #[test]
    fn test_first_rule_wins_on_overlap() {
        let engine = IntentEngine::new();
        // Both the inventory and the emergency rule match; inventory is listed first.
        let reply = engine.classify("urgente: se agotó el stock de suero");
        assert!(reply.content.starts_with("Alerta de inventario"));
    }

    #[test]
    fn test_custom_rules_replace_defaults() {
        let engine = IntentEngine::with_rules(vec![IntentRule::new(
            &["peluquería"],
            Priority::Normal,
            "Baño y corte disponibles los sábados.",
        )]);

        assert_eq!(
            engine.classify("¿Hay peluquería?").content,
            "Baño y corte disponibles los sábados."
        );
        // Default topics are gone
        assert_eq!(engine.classify("stock"), Reply::fallback());
    }

    #[test]
    fn test_added_rule_has_lowest_precedence() {
        let mut engine = IntentEngine::new();
        engine.add_rule(IntentRule {
            keywords: vec!["STOCK".into(), "Hospitalización".into()],
            priority: Priority::Normal,
            response_template: "Hospitalización".into(),
        });

        assert_eq!(engine.classify("stock").priority, Priority::Urgent);
        assert_eq!(
            engine.classify("hospitalización de Toby").content,
            "Hospitalización"
        );
    }

    #[test]
    fn test_rules_from_json() {
        let json = r#"[
            {"keywords": ["Rayos X", " "], "priority": "normal", "response_template": "Radiología en planta baja."},
            {"keywords": ["lab"], "priority": "urgent", "response_template": "Resultados pendientes."}
        ]"#;

        let rules = rules_from_json(json).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].keywords, vec!["rayos x"]);
        assert_eq!(rules[1].priority, Priority::Urgent);
    }

    #[test]
    fn test_rules_from_json_rejects_empty_keywords() {
        let json = r#"[{"keywords": [""], "priority": "info", "response_template": "x"}]"#;
        assert!(matches!(
            rules_from_json(json),
            Err(RuleError::InvalidRule(_))
        ));
        assert!(matches!(
            rules_from_json("not json"),
            Err(RuleError::JsonParse(_))
        ));
    }

    #[test]
    fn test_greeting_is_not_a_topic() {
        // The greeting must not itself trigger a rule if echoed back.
        let engine = IntentEngine::new();
        assert_eq!(engine.classify(GREETING), Reply::fallback());
    }

    proptest! {
        #[test]
        fn prop_classify_is_deterministic(input in ".{0,64}") {
            let engine = IntentEngine::new();
            prop_assert_eq!(engine.classify(&input), engine.classify(&input));
        }
    }
}
