use serde_json::Value;

use super::mint::TokenMint;
use super::pattern::{PatternMatcher, SensitiveCategory};
use super::MaskingTable;

/// Runs one masking pass: for each category in application order, scan the
/// current (already partially masked) text, mint a token per match, record
/// the mapping, and splice the token in. The pass never fails; text with no
/// recognized spans comes back unchanged with an empty table.
pub struct MaskingEngine {
    matcher: PatternMatcher,
}

impl MaskingEngine {
    /// Engine with the built-in category rules.
    pub fn new() -> Self {
        Self {
            matcher: PatternMatcher::default_matcher(),
        }
    }

    pub fn with_matcher(matcher: PatternMatcher) -> Self {
        Self { matcher }
    }

    /// Mask a single text. Returns the masked text and the request-scoped
    /// mapping table; the table has exactly one entry per masked span.
    pub fn mask(&self, text: &str) -> (String, MaskingTable) {
        let mut mint = TokenMint::new();
        let mut table = MaskingTable::new();
        let masked = self.mask_into(text, &mut mint, &mut table);
        (masked, table)
    }

    /// Recursively mask every string leaf of a JSON-like structure.
    ///
    /// One mint and one table are threaded through the entire walk, so token
    /// numbering continues across leaves and the merged table cannot collide.
    /// Non-string scalars pass through unchanged.
    pub fn mask_value(&self, value: &Value) -> (Value, MaskingTable) {
        let mut mint = TokenMint::new();
        let mut table = MaskingTable::new();
        let masked = self.mask_value_into(value, &mut mint, &mut table);
        (masked, table)
    }

    fn mask_into(&self, text: &str, mint: &mut TokenMint, table: &mut MaskingTable) -> String {
        if !self.matcher.has_candidates(text) {
            return text.to_string();
        }

        let mut current = text.to_string();
        for category in SensitiveCategory::APPLICATION_ORDER {
            let spans = self.matcher.matches_for(&current, category);
            if spans.is_empty() {
                continue;
            }

            // Rebuild left to right so token numbering follows reading order.
            let mut out = String::with_capacity(current.len());
            let mut last = 0;
            for span in &spans {
                out.push_str(&current[last..span.start]);
                let token = mint.next_token(category);
                table.insert(
                    token.clone(),
                    current[span.start..span.end].to_string(),
                    category,
                );
                out.push_str(&token);
                last = span.end;
            }
            out.push_str(&current[last..]);
            current = out;
        }
        current
    }

    fn mask_value_into(
        &self,
        value: &Value,
        mint: &mut TokenMint,
        table: &mut MaskingTable,
    ) -> Value {
        match value {
            Value::String(s) => Value::String(self.mask_into(s, mint, table)),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.mask_value_into(v, mint, table)))
                    .collect(),
            ),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|v| self.mask_value_into(v, mint, table))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl Default for MaskingEngine {
    fn default() -> Self {
        Self::new()
    }
}
