use std::collections::HashMap;

use super::pattern::SensitiveCategory;

/// Mints placeholder tokens of the form `[CATEGORY_N]`, N 1-based per
/// category. The counters are caller-owned and scoped to a single masking
/// pass -- there is no process-wide counter, so concurrent passes never
/// coordinate. Uniqueness is guaranteed only within one pass's table.
#[derive(Debug, Default)]
pub struct TokenMint {
    counters: HashMap<SensitiveCategory, u32>,
}

impl TokenMint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next token for `category` and advance its counter.
    pub fn next_token(&mut self, category: SensitiveCategory) -> String {
        let n = self.counters.entry(category).or_insert(0);
        *n += 1;
        format!("[{}_{}]", category.as_str(), n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_per_category() {
        let mut mint = TokenMint::new();
        assert_eq!(mint.next_token(SensitiveCategory::Phone), "[PHONE_1]");
        assert_eq!(mint.next_token(SensitiveCategory::Email), "[EMAIL_1]");
        assert_eq!(mint.next_token(SensitiveCategory::Phone), "[PHONE_2]");
        assert_eq!(mint.next_token(SensitiveCategory::Order), "[ORDER_1]");
    }

    #[test]
    fn test_fresh_mint_restarts_numbering() {
        let mut first = TokenMint::new();
        first.next_token(SensitiveCategory::Phone);
        let mut second = TokenMint::new();
        assert_eq!(second.next_token(SensitiveCategory::Phone), "[PHONE_1]");
    }
}
