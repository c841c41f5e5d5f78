use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConciergeError, Result};
use crate::intent::{extract_json, Intent};
use crate::llm::ReasoningBackend;
use crate::pipeline::Location;
use crate::services::faq::FaqSnippet;
use crate::services::offers::Offer;
use crate::services::profile::LightProfile;
use crate::services::stores::Store;

/// Everything the response stage may look at. All text fields are masked;
/// the reply composed from this bundle therefore contains tokens, never raw
/// sensitive data.
#[derive(Debug, Clone, Serialize)]
pub struct ContextBundle {
    pub masked_message: String,
    pub intents: Vec<Intent>,
    pub location: Location,
    pub stores: Vec<Store>,
    pub profile: LightProfile,
    pub offers: Vec<Offer>,
    pub faq_snippets: Vec<FaqSnippet>,
}

/// The composed result. `reply` is the direct input to selective unmasking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposedResponse {
    pub selected_intent: Option<String>,
    pub selected_store_id: Option<String>,
    pub reasoning: String,
    pub reply: String,
}

/// Prefer the nearest open store; otherwise the nearest store.
pub fn choose_best_store(stores: &[Store]) -> Option<&Store> {
    stores
        .iter()
        .filter(|s| s.is_open_now)
        .min_by(|a, b| a.distance_m.total_cmp(&b.distance_m))
        .or_else(|| stores.iter().min_by(|a, b| a.distance_m.total_cmp(&b.distance_m)))
}

/// Final response composition stage.
pub struct ResponseAgent {
    backend: Option<Arc<dyn ReasoningBackend>>,
}

impl ResponseAgent {
    pub fn new(backend: Option<Arc<dyn ReasoningBackend>>) -> Self {
        Self { backend }
    }

    /// Compose the reply for a context bundle.
    ///
    /// With a backend configured, malformed output degrades to the locally
    /// computable heuristic; transport failure is the caller's to surface.
    pub async fn compose(&self, bundle: &ContextBundle) -> Result<ComposedResponse> {
        let Some(backend) = &self.backend else {
            return Ok(heuristic_response(bundle));
        };

        let prompt = build_prompt(bundle);
        let raw = backend.complete(&prompt).await?;
        match parse_response(&raw) {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::warn!(backend = backend.name(), error = %e, "response stage fell back");
                Ok(heuristic_response(bundle))
            }
        }
    }
}

fn build_prompt(bundle: &ContextBundle) -> String {
    format!(
        "You are a store concierge. Using the context below, respond with JSON \
         only: {{\"selected_intent\", \"selected_store_id\", \"reasoning\", \
         \"reply\"}}. Placeholder tokens like [PHONE_1] in the message must be \
         carried into the reply verbatim, never invented or expanded.\n\
         Context: {}",
        serde_json::to_string(bundle).unwrap_or_default(),
    )
}

fn parse_response(raw: &str) -> Result<ComposedResponse> {
    let json = extract_json(raw).ok_or_else(|| ConciergeError::MalformedOutput {
        reason: "no JSON object in response output".into(),
    })?;
    let response: ComposedResponse =
        serde_json::from_str(json).map_err(|e| ConciergeError::MalformedOutput {
            reason: e.to_string(),
        })?;
    if response.reply.trim().is_empty() {
        return Err(ConciergeError::MalformedOutput {
            reason: "empty reply".into(),
        });
    }
    Ok(response)
}

/// Deterministic local composition: best store, matching offer, and an
/// intent-specific reply.
pub fn heuristic_response(bundle: &ContextBundle) -> ComposedResponse {
    let name = &bundle.profile.name;

    let primary_intent = bundle
        .intents
        .iter()
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence));
    let primary_intent_name = primary_intent.map(|i| i.name.clone());

    let best_store = choose_best_store(&bundle.stores);
    let selected_store_id = best_store.map(|s| s.id.clone());

    let offer_text = best_store
        .and_then(|store| bundle.offers.iter().find(|o| o.store_id == store.id))
        .map(|offer| {
            format!(
                " You also have a coupon: {} (code: {}).",
                offer.description, offer.coupon_code
            )
        })
        .unwrap_or_default();

    let reply = match (primary_intent_name.as_deref(), best_store) {
        (Some("FIND_NEARBY_COFFEE_SHOP"), Some(store)) => {
            let mut reply = format!(
                "Hi {name}, you're close to {} ({} meters away). It's currently {}. ",
                store.name,
                store.distance_m as i64,
                if store.is_open_now { "open" } else { "closed" },
            );
            if store.is_open_now {
                reply.push_str("You can step inside to warm up with a hot drink.");
            } else {
                reply.push_str("It will open later according to its schedule.");
            }
            reply.push_str(&offer_text);
            reply
        }
        _ => format!(
            "Hi {name}, I received your message: '{}'. I can help you find nearby \
             stores or track orders.",
            bundle.masked_message,
        ),
    };

    ComposedResponse {
        selected_intent: primary_intent_name,
        selected_store_id,
        reasoning: primary_intent
            .map(|i| i.reason.clone())
            .unwrap_or_else(|| "no primary intent detected".into()),
        reply,
    }
}
