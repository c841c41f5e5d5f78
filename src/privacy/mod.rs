pub mod mask;
pub mod mint;
pub mod pattern;
pub mod unmask;

pub use mask::MaskingEngine;
pub use mint::TokenMint;
pub use pattern::{MatchSpan, PatternMatcher, SensitiveCategory};
pub use unmask::unmask;

use std::collections::{HashMap, HashSet};

use serde::Serialize;

/// The original value behind one minted token.
#[derive(Debug, Clone, Serialize)]
pub struct MaskEntry {
    pub value: String,
    pub category: SensitiveCategory,
}

/// Request-scoped token -> original-value associations produced by one
/// masking pass. Populated monotonically during the pass (entries are never
/// removed or rewritten), read-only afterwards, discarded with the request.
/// The table must never cross the process boundary it protects; it is
/// serializable only so the façade can include it in opt-in debug payloads.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct MaskingTable {
    entries: HashMap<String, MaskEntry>,
}

impl MaskingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, token: String, value: String, category: SensitiveCategory) {
        self.entries.insert(token, MaskEntry { value, category });
    }

    pub fn get(&self, token: &str) -> Option<&MaskEntry> {
        self.entries.get(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MaskEntry)> {
        self.entries.iter()
    }

    /// Categories that produced at least one entry in this pass.
    pub fn categories(&self) -> HashSet<SensitiveCategory> {
        self.entries.values().map(|e| e.category).collect()
    }
}
