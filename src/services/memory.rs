use std::collections::HashMap;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::stores::StoreSummary;

/// One conversation turn: the raw user message and the unmasked reply.
/// Memory is written strictly after selective unmasking -- placeholder
/// tokens must never be persisted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user: String,
    pub bot: String,
    pub at: DateTime<Utc>,
}

/// Volatile per-user memory. No persistence; the process owns the data for
/// its lifetime only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMemory {
    pub preferences: HashMap<String, Vec<String>>,
    pub history: Vec<ConversationTurn>,
    pub last_seen_store: Option<StoreSummary>,
    pub last_order: Option<serde_json::Value>,
}

impl Default for UserMemory {
    fn default() -> Self {
        let preferences = ["favorite_drinks", "dislikes", "allergies"]
            .into_iter()
            .map(|k| (k.to_string(), Vec::new()))
            .collect();
        Self {
            preferences,
            history: Vec::new(),
            last_seen_store: None,
            last_order: None,
        }
    }
}

/// Concurrent user-memory store keyed by user id. The dashmap serializes
/// writes per entry, which is exactly the per-user-identifier write
/// serialization the memory collaborator is required to provide.
pub struct MemoryStore {
    users: DashMap<String, UserMemory>,
    history_limit: usize,
}

impl MemoryStore {
    pub fn new(history_limit: usize) -> Self {
        Self {
            users: DashMap::new(),
            history_limit,
        }
    }

    /// A point-in-time copy of one user's memory (default-initialized for
    /// users never seen before).
    pub fn snapshot(&self, user_id: &str) -> UserMemory {
        self.users
            .get(user_id)
            .map(|m| m.value().clone())
            .unwrap_or_default()
    }

    /// Append a turn, evicting the oldest beyond the history limit.
    pub fn record_turn(&self, user_id: &str, user_message: &str, reply: &str) {
        let mut memory = self.users.entry(user_id.to_string()).or_default();
        memory.history.push(ConversationTurn {
            user: user_message.to_string(),
            bot: reply.to_string(),
            at: Utc::now(),
        });
        let excess = memory.history.len().saturating_sub(self.history_limit);
        if excess > 0 {
            memory.history.drain(..excess);
        }
    }

    pub fn store_preference(&self, user_id: &str, key: &str, value: &str) {
        let mut memory = self.users.entry(user_id.to_string()).or_default();
        let values = memory.preferences.entry(key.to_string()).or_default();
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }

    pub fn set_last_seen_store(&self, user_id: &str, store: StoreSummary) {
        let mut memory = self.users.entry(user_id.to_string()).or_default();
        memory.last_seen_store = Some(store);
    }

    pub fn set_last_order(&self, user_id: &str, order: serde_json::Value) {
        let mut memory = self.users.entry(user_id.to_string()).or_default();
        memory.last_order = Some(order);
    }

    /// Drop one user's memory. Returns whether anything was removed.
    pub fn reset(&self, user_id: &str) -> bool {
        self.users.remove(user_id).is_some()
    }

    /// Drop all user memory.
    pub fn reset_all(&self) {
        self.users.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let store = MemoryStore::new(20);
        for i in 0..25 {
            store.record_turn("u1", &format!("message {i}"), "reply");
        }
        let memory = store.snapshot("u1");
        assert_eq!(memory.history.len(), 20);
        // Oldest evicted first.
        assert_eq!(memory.history[0].user, "message 5");
        assert_eq!(memory.history[19].user, "message 24");
    }

    #[test]
    fn test_preferences_deduplicate() {
        let store = MemoryStore::new(20);
        store.store_preference("u1", "favorite_drinks", "mocha");
        store.store_preference("u1", "favorite_drinks", "mocha");
        let memory = store.snapshot("u1");
        assert_eq!(memory.preferences["favorite_drinks"], vec!["mocha"]);
    }

    #[test]
    fn test_reset_single_user() {
        let store = MemoryStore::new(20);
        store.record_turn("u1", "hi", "hello");
        store.record_turn("u2", "hi", "hello");
        assert!(store.reset("u1"));
        assert!(!store.reset("u1"));
        assert!(store.snapshot("u1").history.is_empty());
        assert_eq!(store.snapshot("u2").history.len(), 1);
    }

    #[test]
    fn test_reset_all() {
        let store = MemoryStore::new(20);
        store.record_turn("u1", "hi", "hello");
        store.reset_all();
        assert!(store.snapshot("u1").history.is_empty());
    }

    #[test]
    fn test_last_order_and_store_are_tracked() {
        let store = MemoryStore::new(20);
        store.set_last_order("u1", serde_json::json!({"id": "ORD12345"}));
        store.set_last_seen_store(
            "u1",
            StoreSummary {
                id: "store_101".into(),
                name: "Starbucks MG Road".into(),
                distance_m: 120.0,
                rating: Some(4.4),
                is_open_now: Some(true),
            },
        );
        let memory = store.snapshot("u1");
        assert_eq!(memory.last_order.unwrap()["id"], "ORD12345");
        assert_eq!(memory.last_seen_store.unwrap().id, "store_101");
    }

    #[test]
    fn test_unseen_user_gets_default_memory() {
        let store = MemoryStore::new(20);
        let memory = store.snapshot("ghost");
        assert!(memory.preferences.contains_key("allergies"));
        assert!(memory.last_seen_store.is_none());
    }
}
