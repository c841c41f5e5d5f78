use std::sync::Arc;

use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};

use crate::error::{ConciergeError, Result};
use crate::llm::ReasoningBackend;
use crate::pipeline::Location;
use crate::services::profile::LightProfile;

/// Intents returned per request, at most this many.
pub const MAX_INTENTS: usize = 5;

/// One inferred intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    pub confidence: f64,
    pub reason: String,
    #[serde(default)]
    pub required_data: Vec<String>,
    pub category: String,
}

/// The single low-confidence intent substituted when the backing reasoning
/// engine produces output that cannot be parsed.
pub fn fallback_intent() -> Intent {
    Intent {
        name: "FALLBACK_GENERIC".into(),
        confidence: 0.3,
        reason: "reasoning output was malformed; generic fallback".into(),
        required_data: Vec::new(),
        category: "fallback".into(),
    }
}

// Keyword table for the heuristic path. Indices below MARKER_SPLIT signal
// store discovery; the rest signal order support.
const KEYWORDS: [&str; 4] = ["coffee", "cold", "order", "where is my"];
const MARKER_SPLIT: usize = 2;

/// Intent inference stage. Operates on masked text only; the raw message
/// never reaches this module.
pub struct IntentAgent {
    backend: Option<Arc<dyn ReasoningBackend>>,
    keywords: AhoCorasick,
}

impl IntentAgent {
    pub fn new(backend: Option<Arc<dyn ReasoningBackend>>) -> Self {
        Self {
            backend,
            keywords: AhoCorasick::new(KEYWORDS).expect("intent keywords compile"),
        }
    }

    /// Ordered intents for the masked message, best first.
    ///
    /// With a backend configured, malformed output degrades to the single
    /// fallback intent; transport failure is the caller's to surface.
    /// Without one, deterministic keyword heuristics apply.
    pub async fn infer(
        &self,
        masked_message: &str,
        profile: &LightProfile,
        location: &Location,
    ) -> Result<Vec<Intent>> {
        let Some(backend) = &self.backend else {
            return Ok(self.heuristic_intents(masked_message));
        };

        let prompt = self.build_prompt(masked_message, profile, location);
        let raw = backend.complete(&prompt).await?;
        match parse_intents(&raw) {
            Ok(intents) => Ok(intents),
            Err(e) => {
                tracing::warn!(backend = backend.name(), error = %e, "intent stage fell back");
                Ok(vec![fallback_intent()])
            }
        }
    }

    fn build_prompt(
        &self,
        masked_message: &str,
        profile: &LightProfile,
        location: &Location,
    ) -> String {
        format!(
            "You classify a customer message into up to {MAX_INTENTS} intents.\n\
             Respond with JSON only: {{\"intents\": [{{\"name\", \"confidence\", \
             \"reason\", \"required_data\", \"category\"}}]}}.\n\
             Message: {masked_message}\n\
             Profile: {}\n\
             Location: {}",
            serde_json::to_string(profile).unwrap_or_default(),
            serde_json::to_string(location).unwrap_or_default(),
        )
    }

    fn heuristic_intents(&self, masked_message: &str) -> Vec<Intent> {
        let lower = masked_message.to_lowercase();
        let mut store_discovery = false;
        let mut order_support = false;
        for m in self.keywords.find_iter(&lower) {
            if m.pattern().as_usize() < MARKER_SPLIT {
                store_discovery = true;
            } else {
                order_support = true;
            }
        }

        let mut intents = Vec::new();
        if store_discovery {
            intents.push(Intent {
                name: "FIND_NEARBY_COFFEE_SHOP".into(),
                confidence: 0.9,
                reason: "message suggests a warm drink at a nearby shop".into(),
                required_data: vec![
                    "nearby_stores".into(),
                    "opening_hours".into(),
                    "distance".into(),
                    "offers".into(),
                ],
                category: "store_discovery".into(),
            });
            intents.push(Intent {
                name: "SUGGEST_WARM_DRINK".into(),
                confidence: 0.85,
                reason: "warm beverages are relevant to the message".into(),
                required_data: vec![
                    "menu_items".into(),
                    "user_favorites".into(),
                    "offers".into(),
                ],
                category: "personalized_recommendation".into(),
            });
        } else if order_support {
            intents.push(Intent {
                name: "TRACK_ORDER_STATUS".into(),
                confidence: 0.9,
                reason: "message asks about an order".into(),
                required_data: vec!["order_status".into()],
                category: "order_support".into(),
            });
        } else {
            intents.push(Intent {
                name: "GENERAL_QUERY".into(),
                confidence: 0.5,
                reason: "no specific signal; default intent".into(),
                required_data: Vec::new(),
                category: "generic".into(),
            });
        }

        // Pad to the full slate with low-confidence fillers.
        while intents.len() < MAX_INTENTS {
            intents.push(Intent {
                name: format!("FILLER_INTENT_{}", intents.len() + 1),
                confidence: 0.1,
                reason: "low-confidence filler".into(),
                required_data: Vec::new(),
                category: "fallback".into(),
            });
        }
        intents.truncate(MAX_INTENTS);
        intents
    }
}

#[derive(Debug, Deserialize)]
struct IntentsPayload {
    intents: Vec<Intent>,
}

/// Parse the reasoning engine's output. Confidences are clamped to [0, 1]
/// and the list is capped at [`MAX_INTENTS`].
fn parse_intents(raw: &str) -> Result<Vec<Intent>> {
    let json = extract_json(raw).ok_or_else(|| ConciergeError::MalformedOutput {
        reason: "no JSON object in intent output".into(),
    })?;
    let payload: IntentsPayload =
        serde_json::from_str(json).map_err(|e| ConciergeError::MalformedOutput {
            reason: e.to_string(),
        })?;
    if payload.intents.is_empty() {
        return Err(ConciergeError::MalformedOutput {
            reason: "empty intent list".into(),
        });
    }

    let mut intents = payload.intents;
    for intent in &mut intents {
        intent.confidence = intent.confidence.clamp(0.0, 1.0);
    }
    intents.truncate(MAX_INTENTS);
    Ok(intents)
}

/// Slice out the outermost `{...}` from model output that may be wrapped in
/// prose or code fences.
pub(crate) fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> IntentAgent {
        IntentAgent::new(None)
    }

    #[test]
    fn test_coffee_message_yields_store_discovery() {
        let intents = agent().heuristic_intents("I'm cold and want a coffee");
        assert_eq!(intents.len(), MAX_INTENTS);
        assert_eq!(intents[0].name, "FIND_NEARBY_COFFEE_SHOP");
        assert_eq!(intents[1].name, "SUGGEST_WARM_DRINK");
    }

    #[test]
    fn test_order_message_yields_order_support() {
        let intents = agent().heuristic_intents("where is my [ORDER_1]?");
        assert_eq!(intents[0].name, "TRACK_ORDER_STATUS");
    }

    #[test]
    fn test_unclassified_message_yields_general_query() {
        let intents = agent().heuristic_intents("tell me a joke");
        assert_eq!(intents[0].name, "GENERAL_QUERY");
        assert!(intents[1].name.starts_with("FILLER_INTENT_"));
    }

    #[test]
    fn test_parse_clamps_confidence_and_caps_list() {
        let raw = r#"{"intents": [
            {"name": "A", "confidence": 7.5, "reason": "r", "category": "c"},
            {"name": "B", "confidence": -1.0, "reason": "r", "category": "c"},
            {"name": "C", "confidence": 0.5, "reason": "r", "category": "c"},
            {"name": "D", "confidence": 0.5, "reason": "r", "category": "c"},
            {"name": "E", "confidence": 0.5, "reason": "r", "category": "c"},
            {"name": "F", "confidence": 0.5, "reason": "r", "category": "c"}
        ]}"#;
        let intents = parse_intents(raw).unwrap();
        assert_eq!(intents.len(), MAX_INTENTS);
        assert_eq!(intents[0].confidence, 1.0);
        assert_eq!(intents[1].confidence, 0.0);
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(parse_intents("I could not decide on any intent.").is_err());
    }

    #[test]
    fn test_extract_json_from_fenced_output() {
        let raw = "```json\n{\"intents\": []}\n```";
        assert_eq!(extract_json(raw), Some("{\"intents\": []}"));
    }

    #[test]
    fn test_fallback_intent_shape() {
        let intent = fallback_intent();
        assert_eq!(intent.name, "FALLBACK_GENERIC");
        assert_eq!(intent.confidence, 0.3);
        assert!(intent.required_data.is_empty());
        assert_eq!(intent.category, "fallback");
    }
}
