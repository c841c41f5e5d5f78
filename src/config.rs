use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConciergeError, Result};
use crate::privacy::SensitiveCategory;

/// Top-level service configuration, loaded from `.concierge/config.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConciergeConfig {
    /// Listen address for the HTTP façade. Default: 127.0.0.1:8080.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Categories the unmasking stage may disclose in replies.
    /// Absent means unrestricted: every token masked during the request is
    /// restored in the final reply.
    #[serde(default)]
    pub disclosure: Option<Vec<SensitiveCategory>>,

    /// FAQ snippets retrieved per request. Default: 3.
    #[serde(default = "default_faq_top_k")]
    pub faq_top_k: usize,

    /// Conversation turns retained per user, oldest evicted first.
    /// Default: 20.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Include the debug bundle in chat responses. Default: false.
    #[serde(default)]
    pub debug: bool,

    /// Reasoning backend for the intent and response stages.
    #[serde(default)]
    pub reasoning: ReasoningConfig,

    /// Optional user directory file (JSON). Unknown users fall back to a
    /// guest profile either way.
    #[serde(default)]
    pub users_file: Option<PathBuf>,

    /// Optional store catalog file (YAML) replacing the built-in demo
    /// catalog.
    #[serde(default)]
    pub stores_file: Option<PathBuf>,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".into()
}
fn default_faq_top_k() -> usize {
    3
}
fn default_history_limit() -> usize {
    20
}

impl Default for ConciergeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            disclosure: None,
            faq_top_k: default_faq_top_k(),
            history_limit: default_history_limit(),
            debug: false,
            reasoning: ReasoningConfig::default(),
            users_file: None,
            stores_file: None,
        }
    }
}

impl ConciergeConfig {
    /// Load config from a YAML file. Returns defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| ConciergeError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load config from the project root. Checks `.concierge/config.yml`.
    pub fn load_project(project_root: &Path) -> Result<Self> {
        let path = project_root.join(".concierge").join("config.yml");
        Self::load_from(&path)
    }

    /// The disclosure allow-list as a set, `None` when unrestricted.
    pub fn disclosure_set(&self) -> Option<HashSet<SensitiveCategory>> {
        self.disclosure
            .as_ref()
            .map(|list| list.iter().copied().collect())
    }
}

/// Backend for the two reasoning stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend")]
pub enum ReasoningConfig {
    /// Deterministic local heuristics; no network calls.
    #[serde(rename = "heuristic")]
    Heuristic,
    /// Chat-completion style HTTP API. Both stages degrade to the local
    /// heuristics when the API returns malformed output.
    #[serde(rename = "api")]
    Api {
        base_url: String,
        model: Option<String>,
        max_tokens: Option<u32>,
    },
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self::Heuristic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConciergeConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.faq_top_k, 3);
        assert_eq!(config.history_limit, 20);
        assert!(config.disclosure.is_none());
        assert!(!config.debug);
        assert!(matches!(config.reasoning, ReasoningConfig::Heuristic));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: ConciergeConfig =
            serde_yaml::from_str("bind_addr: 0.0.0.0:9000\ndebug: true\n").unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert!(config.debug);
        assert_eq!(config.history_limit, 20);
    }

    #[test]
    fn test_disclosure_parses_categories() {
        let config: ConciergeConfig =
            serde_yaml::from_str("disclosure: [PHONE, ORDER]\n").unwrap();
        let set = config.disclosure_set().unwrap();
        assert!(set.contains(&SensitiveCategory::Phone));
        assert!(set.contains(&SensitiveCategory::Order));
        assert!(!set.contains(&SensitiveCategory::Email));
    }

    #[test]
    fn test_api_backend_tag() {
        let config: ConciergeConfig = serde_yaml::from_str(
            "reasoning:\n  backend: api\n  base_url: http://localhost:11434\n  model: llama3.1\n",
        )
        .unwrap();
        match config.reasoning {
            ReasoningConfig::Api { base_url, model, .. } => {
                assert_eq!(base_url, "http://localhost:11434");
                assert_eq!(model.as_deref(), Some("llama3.1"));
            }
            _ => panic!("expected api backend"),
        }
    }
}
