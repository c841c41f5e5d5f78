use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;

use crate::error::{ConciergeError, Result};
use crate::pipeline::{run_chat, AppServices, ChatRequest};
use crate::services::stores::StoreSummary;

/// Chat response shape returned by the façade.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_store: Option<StoreSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<serde_json::Value>,
}

/// Every error crossing the HTTP boundary renders as a generic service
/// error; details stay in the logs, never in the payload.
impl IntoResponse for ConciergeError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "internal service error"})),
        )
            .into_response()
    }
}

/// Build the full router.
pub fn build_router(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/reset_user/:user_id", post(reset_user))
        .route("/reset_all", post(reset_all))
        .with_state(services)
}

/// Bind and serve until the process is stopped.
pub async fn serve(services: AppServices) -> Result<()> {
    let addr = services.config.bind_addr.clone();
    let app = build_router(Arc::new(services));

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ConciergeError::Server {
            reason: format!("failed to bind {addr}: {e}"),
        })?;
    tracing::info!("concierge listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ConciergeError::Server {
            reason: e.to_string(),
        })
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

async fn chat(
    State(services): State<Arc<AppServices>>,
    Json(request): Json<ChatRequest>,
) -> std::result::Result<Json<ChatResponse>, ConciergeError> {
    let outcome = run_chat(&services, request).await?;
    Ok(Json(ChatResponse {
        reply: outcome.reply,
        selected_intent: outcome.selected_intent,
        selected_store: outcome.selected_store,
        debug: outcome.debug,
    }))
}

async fn reset_user(
    State(services): State<Arc<AppServices>>,
    Path(user_id): Path<String>,
) -> Json<serde_json::Value> {
    let removed = services.memory.reset(&user_id);
    Json(json!({"status": "ok", "removed": removed}))
}

async fn reset_all(State(services): State<Arc<AppServices>>) -> Json<serde_json::Value> {
    services.memory.reset_all();
    Json(json!({"status": "ok"}))
}
