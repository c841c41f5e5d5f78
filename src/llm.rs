use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::ReasoningConfig;
use crate::error::{ConciergeError, Result};

/// A chat-completion style reasoning engine. Both agent stages talk to it
/// through this seam and only ever hand it masked text.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Complete a prompt, returning the raw model text.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Name of this backend (for logging).
    fn name(&self) -> &str;
}

/// Build the backend selected by config. `Heuristic` means no backend at
/// all -- the agents then run their local deterministic paths.
pub fn backend_from_config(config: &ReasoningConfig) -> Option<Arc<dyn ReasoningBackend>> {
    match config {
        ReasoningConfig::Heuristic => None,
        ReasoningConfig::Api {
            base_url,
            model,
            max_tokens,
        } => Some(Arc::new(ApiBackend::new(
            base_url.clone(),
            model.clone(),
            *max_tokens,
        ))),
    }
}

/// Chat-completions HTTP backend.
pub struct ApiBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl ApiBackend {
    pub fn new(base_url: String, model: Option<String>, max_tokens: Option<u32>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            model: model.unwrap_or_else(|| "llama3.1".into()),
            max_tokens: max_tokens.unwrap_or(1024),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[async_trait]
impl ReasoningBackend for ApiBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConciergeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ConciergeError::Backend {
                reason: "completion had no choices".into(),
            })
    }

    fn name(&self) -> &str {
        "api"
    }
}
