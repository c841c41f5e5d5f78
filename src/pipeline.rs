use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::ConciergeConfig;
use crate::error::Result;
use crate::intent::IntentAgent;
use crate::llm::backend_from_config;
use crate::privacy::{unmask, MaskingEngine};
use crate::response::{ContextBundle, ResponseAgent};
use crate::services::faq::FaqIndex;
use crate::services::memory::MemoryStore;
use crate::services::offers::offers_for_stores;
use crate::services::profile::UserDirectory;
use crate::services::stores::{StoreLocator, StoreSummary};

/// One chat request, as accepted by the façade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Caller location as passed through to the reasoning stages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Location {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// The pipeline's result, ready for the façade to return.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub reply: String,
    pub selected_intent: Option<String>,
    pub selected_store: Option<StoreSummary>,
    pub debug: Option<serde_json::Value>,
}

/// Everything a request needs, built once and shared across requests.
/// All fields are immutable per request except the memory store, which
/// serializes its own writes per user.
pub struct AppServices {
    pub config: ConciergeConfig,
    pub masking: MaskingEngine,
    pub intents: IntentAgent,
    pub responder: ResponseAgent,
    pub locator: StoreLocator,
    pub directory: UserDirectory,
    pub faq: FaqIndex,
    pub memory: MemoryStore,
}

impl AppServices {
    /// Wire up all collaborators from config.
    pub fn from_config(config: ConciergeConfig) -> Result<Self> {
        let backend = backend_from_config(&config.reasoning);
        let directory = match &config.users_file {
            Some(path) => UserDirectory::load_from(path)?,
            None => UserDirectory::empty(),
        };
        let locator = match &config.stores_file {
            Some(path) => StoreLocator::load_from(path)?,
            None => StoreLocator::new(),
        };
        Ok(Self {
            masking: MaskingEngine::new(),
            intents: IntentAgent::new(backend.clone()),
            responder: ResponseAgent::new(backend),
            locator,
            directory,
            faq: FaqIndex::new(),
            memory: MemoryStore::new(config.history_limit),
            config,
        })
    }
}

/// The request-level flow: mask, reason over masked text, compose, then
/// selectively unmask and record memory.
///
/// The mapping table lives on this function's stack for exactly one request;
/// reasoning stages and FAQ retrieval only ever see masked text. Errors here
/// are transport-level backend failures only -- every content-level problem
/// degrades locally inside the stages.
pub async fn run_chat(services: &AppServices, request: ChatRequest) -> Result<ChatOutcome> {
    let profile = services.directory.light_profile(&request.user_id);
    let location = Location {
        lat: request.lat,
        lng: request.lng,
    };

    let (masked_message, table) = services.masking.mask(&request.message);
    tracing::debug!(
        user_id = %request.user_id,
        masked_spans = table.len(),
        "masked inbound message"
    );

    let intents = services
        .intents
        .infer(&masked_message, &profile, &location)
        .await?;

    let stores = services.locator.nearby(request.lat, request.lng);
    let offers = offers_for_stores(profile.loyalty_tier, &stores);
    let faq_snippets = services
        .faq
        .query(&masked_message, services.config.faq_top_k);

    let bundle = ContextBundle {
        masked_message: masked_message.clone(),
        intents,
        location,
        stores,
        profile,
        offers,
        faq_snippets,
    };
    let composed = services.responder.compose(&bundle).await?;

    // The composed reply carries tokens; disclosure policy decides what the
    // caller actually sees.
    let allowed = services.config.disclosure_set();
    let reply = unmask(&composed.reply, &table, allowed.as_ref());

    services
        .memory
        .record_turn(&request.user_id, &request.message, &reply);

    let selected_store = composed.selected_store_id.as_ref().and_then(|id| {
        bundle
            .stores
            .iter()
            .find(|s| &s.id == id)
            .map(StoreSummary::from_store)
    });
    if let Some(store) = &selected_store {
        services
            .memory
            .set_last_seen_store(&request.user_id, store.clone());
    }

    let debug = services.config.debug.then(|| {
        json!({
            "masked_message": &masked_message,
            "intents": &bundle.intents,
            "candidate_stores": &bundle.stores,
            "offers": &bundle.offers,
            "faq_snippets": &bundle.faq_snippets,
            "composed": &composed,
        })
    });

    Ok(ChatOutcome {
        reply,
        selected_intent: composed.selected_intent,
        selected_store,
        debug,
    })
}
