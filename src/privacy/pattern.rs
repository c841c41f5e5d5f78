use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};

use crate::error::{ConciergeError, Result};

/// A closed enumeration of sensitive-data categories. The set is fixed at
/// compile time; adding a category means adding a variant and a pattern to
/// [`PatternMatcher::default_rules`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SensitiveCategory {
    Phone,
    Email,
    Order,
}

impl SensitiveCategory {
    /// Fixed category-application order for a masking pass. Once a span is
    /// masked it is invisible to later categories, so reordering this table
    /// changes masking output and is a breaking change.
    pub const APPLICATION_ORDER: [SensitiveCategory; 3] = [
        SensitiveCategory::Phone,
        SensitiveCategory::Email,
        SensitiveCategory::Order,
    ];

    /// The uppercase tag used inside minted tokens.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensitiveCategory::Phone => "PHONE",
            SensitiveCategory::Email => "EMAIL",
            SensitiveCategory::Order => "ORDER",
        }
    }
}

impl std::fmt::Display for SensitiveCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SensitiveCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PHONE" => Ok(SensitiveCategory::Phone),
            "EMAIL" => Ok(SensitiveCategory::Email),
            "ORDER" => Ok(SensitiveCategory::Order),
            _ => Err(format!("unknown sensitive category: {s}")),
        }
    }
}

/// One discovered occurrence of a sensitive span. Byte offsets index the
/// text that was scanned; the original substring is recovered by slicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub category: SensitiveCategory,
    pub start: usize,
    pub end: usize,
}

/// One (category, pattern) rule.
#[derive(Debug)]
pub struct CategoryRule {
    pub category: SensitiveCategory,
    pattern: Regex,
}

/// Recognizes sensitive spans via an ordered table of (category, pattern)
/// rules. Matching is stateless and pure: within a category, all
/// non-overlapping matches are produced left to right with the regex
/// crate's leftmost-first greedy semantics -- that choice is part of the
/// contract, since unmask round-trips depend on consistent boundaries.
///
/// Spans that overlap an already-minted token (`[CATEGORY_N]`) are never
/// matched: the token shield is what keeps token syntax inert to every
/// pattern, so a second pass over fully masked text finds nothing.
pub struct PatternMatcher {
    rules: Vec<CategoryRule>,
    prescreen: RegexSet,
    token_shield: Regex,
}

impl PatternMatcher {
    /// Build from an ordered list of (category, pattern) rules.
    pub fn new(rules: Vec<(SensitiveCategory, String)>) -> Result<Self> {
        let prescreen = RegexSet::new(rules.iter().map(|(_, p)| p.as_str())).map_err(|e| {
            ConciergeError::InvalidPattern {
                reason: e.to_string(),
            }
        })?;
        let compiled = rules
            .into_iter()
            .map(|(category, p)| {
                Regex::new(&p)
                    .map(|pattern| CategoryRule { category, pattern })
                    .map_err(|e| ConciergeError::InvalidPattern {
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rules: compiled,
            prescreen,
            token_shield: Regex::new(r"\[[A-Z]+_[0-9]+\]").expect("token shield pattern compiles"),
        })
    }

    /// The built-in rule set, in application order.
    pub fn default_rules() -> Vec<(SensitiveCategory, String)> {
        vec![
            // Phone-shaped runs: optional leading `+`, 9-16 chars of digits
            // with interior hyphens/spaces, ending in a digit.
            (SensitiveCategory::Phone, r"\+?\d[\d\- ]{7,14}\d".into()),
            (
                SensitiveCategory::Email,
                r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}".into(),
            ),
            // ORD1234 / ORD-1234 / ORDER_5678, as a whole word.
            (
                SensitiveCategory::Order,
                r"\b(?:ORD|ORDER)[-_]?[0-9]+\b".into(),
            ),
        ]
    }

    /// Matcher with the built-in rules.
    pub fn default_matcher() -> Self {
        Self::new(Self::default_rules()).expect("built-in patterns should compile")
    }

    /// Fast check whether any category could match at all.
    pub fn has_candidates(&self, text: &str) -> bool {
        self.prescreen.is_match(text)
    }

    /// All shielded, non-overlapping matches for one category, left to right.
    pub fn matches_for(&self, text: &str, category: SensitiveCategory) -> Vec<MatchSpan> {
        let Some(rule) = self.rules.iter().find(|r| r.category == category) else {
            return Vec::new();
        };

        let shielded: Vec<(usize, usize)> = self
            .token_shield
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect();

        rule.pattern
            .find_iter(text)
            .filter(|m| {
                !shielded
                    .iter()
                    .any(|&(s, e)| m.start() < e && s < m.end())
            })
            .map(|m| MatchSpan {
                category,
                start: m.start(),
                end: m.end(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_text<'a>(text: &'a str, span: &MatchSpan) -> &'a str {
        &text[span.start..span.end]
    }

    #[test]
    fn test_phone_with_country_code() {
        let matcher = PatternMatcher::default_matcher();
        let text = "reach me at +91-98765-43210 tomorrow";
        let spans = matcher.matches_for(text, SensitiveCategory::Phone);
        assert_eq!(spans.len(), 1);
        assert_eq!(span_text(text, &spans[0]), "+91-98765-43210");
    }

    #[test]
    fn test_phone_does_not_trail_into_space() {
        let matcher = PatternMatcher::default_matcher();
        let text = "call 987654321 now";
        let spans = matcher.matches_for(text, SensitiveCategory::Phone);
        assert_eq!(spans.len(), 1);
        assert_eq!(span_text(text, &spans[0]), "987654321");
    }

    #[test]
    fn test_email_shapes() {
        let matcher = PatternMatcher::default_matcher();
        let text = "mail ganesh@example.com or ops.team+1@sub.example.co";
        let spans = matcher.matches_for(text, SensitiveCategory::Email);
        assert_eq!(spans.len(), 2);
        assert_eq!(span_text(text, &spans[0]), "ganesh@example.com");
        assert_eq!(span_text(text, &spans[1]), "ops.team+1@sub.example.co");
    }

    #[test]
    fn test_order_variants() {
        let matcher = PatternMatcher::default_matcher();
        for text in ["ORD1234", "ORD-1234", "ORDER_5678", "ORDER90"] {
            let spans = matcher.matches_for(text, SensitiveCategory::Order);
            assert_eq!(spans.len(), 1, "no match in {text:?}");
            assert_eq!(span_text(text, &spans[0]), text);
        }
    }

    #[test]
    fn test_order_requires_word_boundary() {
        let matcher = PatternMatcher::default_matcher();
        let spans = matcher.matches_for("REORDER123", SensitiveCategory::Order);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_token_shield_blocks_order_inside_token() {
        // "[ORDER_1]" contains the substring "ORDER_1", which the ORDER
        // pattern would otherwise match. The shield keeps it inert.
        let matcher = PatternMatcher::default_matcher();
        let spans = matcher.matches_for("status of [ORDER_1] please", SensitiveCategory::Order);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = PatternMatcher::new(vec![(SensitiveCategory::Phone, "[oops".into())]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_candidates_on_clean_text() {
        let matcher = PatternMatcher::default_matcher();
        assert!(!matcher.has_candidates("hello world"));
    }
}
