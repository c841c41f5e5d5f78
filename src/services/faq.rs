use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One retrieved FAQ snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqSnippet {
    pub text: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct FaqDoc {
    id: String,
    text: String,
    metadata: HashMap<String, String>,
    tokens: Vec<String>,
}

/// In-memory FAQ retrieval over the policy corpus. Queries are ranked by
/// token-level Jaccard overlap; an empty index returns an empty list and
/// never errors. The query is expected to be masked text -- retrieval works
/// fine with tokens in place since placeholder tokens simply never overlap
/// the corpus vocabulary.
pub struct FaqIndex {
    docs: Vec<FaqDoc>,
}

impl FaqIndex {
    /// Index over the built-in policy documents.
    pub fn new() -> Self {
        let docs = builtin_corpus()
            .into_iter()
            .map(|(id, text, category, source_file)| {
                let metadata = HashMap::from([
                    ("category".to_string(), category.to_string()),
                    ("source_file".to_string(), source_file.to_string()),
                ]);
                FaqDoc {
                    id: id.to_string(),
                    tokens: tokenize(text),
                    text: text.to_string(),
                    metadata,
                }
            })
            .collect();
        Self { docs }
    }

    pub fn empty() -> Self {
        Self { docs: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Up to `top_k` snippets relevant to the query, best first. Documents
    /// with zero overlap are not returned.
    pub fn query(&self, query: &str, top_k: usize) -> Vec<FaqSnippet> {
        if self.docs.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &FaqDoc)> = self
            .docs
            .iter()
            .map(|doc| (jaccard_coefficient(&query_tokens, &doc.tokens), doc))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        // Stable tiebreak on id keeps results deterministic.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));

        scored
            .into_iter()
            .take(top_k)
            .map(|(_, doc)| FaqSnippet {
                text: doc.text.clone(),
                metadata: doc.metadata.clone(),
            })
            .collect()
    }
}

impl Default for FaqIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Split on whitespace and punctuation, lowercase, deduplicate, sort.
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens: Vec<String> = input
        .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}

/// Jaccard coefficient between two sorted, deduplicated token slices.
fn jaccard_coefficient(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = sorted_intersection_count(a, b);
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

fn sorted_intersection_count(a: &[String], b: &[String]) -> usize {
    let mut count = 0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

fn builtin_corpus() -> Vec<(&'static str, &'static str, &'static str, &'static str)> {
    vec![
        (
            "return_policy_1",
            "Return & Refund Policy. Customers may return eligible products within \
             30 days of purchase. Perishables such as baked items or fresh beverages \
             must be reported within 24 hours. Items must be unopened, unused, and in \
             their original packaging. Gift cards and promotional items are \
             non-refundable. Refunds are issued to the original mode of payment and \
             may take 2-5 business days. Online orders can be returned via the Order \
             History section. Customized beverages, discounted merchandise, opened \
             food items, and free promotional products are not eligible for return.",
            "return_policy",
            "return_policy.pdf",
        ),
        (
            "shipping_policy_1",
            "Shipping & Delivery Guidelines. Standard delivery takes 2-4 business \
             days. Express delivery takes 1-2 business days. Same-day delivery is \
             available in select metro cities for orders placed before 2 PM. Standard \
             delivery is free on orders above 499, otherwise a 49 fee applies. \
             Express delivery costs 99 and same-day delivery costs 149. Every order \
             includes a tracking ID that can be used in the Track My Order section. \
             Delays may occur due to weather, holidays, high seasonal demand, or \
             incorrect address. Lost or damaged packages are eligible for refund or \
             replacement.",
            "shipping_policy",
            "shipping_policy.pdf",
        ),
        (
            "wifi_terms_1",
            "In-Store Wi-Fi Terms & Usage Policy. Free Wi-Fi is provided to \
             customers with a valid purchase receipt. Maximum session duration is 2 \
             hours with a bandwidth limit of 5 Mbps per user. Downloading files \
             larger than 200 MB is not allowed. Customers must not visit illegal or \
             harmful websites, perform network attacks, or stream pirated content. \
             Browsing history is not recorded but session metadata such as time \
             connected and device MAC ID is logged. Use of Wi-Fi is at the \
             customer's own risk.",
            "wifi_terms",
            "wifi_terms.pdf",
        ),
        (
            "loyalty_benefits_1",
            "Loyalty Program Benefits Overview. Bronze members earn 1 point per 10 \
             spent and get a birthday beverage at 10% discount. Silver members earn \
             1.5 points per 10, receive a free pastry during their birthday month, \
             and get early access to new menu items. Gold members earn 2 points per \
             10, receive one free beverage every month, get an exclusive 10% discount \
             on hot beverages, and have priority customer support. Points can be \
             redeemed at participating stores or via the mobile app. Points expire 12 \
             months after issuance; tier status is valid for the calendar year.",
            "loyalty",
            "loyalty_benefits.pdf",
        ),
        (
            "allergen_guide_1",
            "Allergen & Ingredient Guide. Common allergens in menu items include \
             milk, soy, wheat or gluten, nuts such as almond, cashew and hazelnut, \
             chocolate, and artificial sweeteners. Hot Chocolate contains milk and \
             soy. Caramel Latte contains dairy and may contain traces of gluten. \
             Mocha Latte contains milk and chocolate. Cold Brew is typically \
             allergen-free unless flavored syrups are added. Blueberry Muffin \
             contains wheat, eggs, and milk. Chocolate Croissant contains wheat, \
             milk, and chocolate. The Vegan Sandwich is dairy-free and egg-free. \
             Cross-contamination may occur in shared kitchens, so customers with \
             severe allergies should inform staff.",
            "allergen",
            "allergen_guide.pdf",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_index_returns_empty() {
        let index = FaqIndex::empty();
        assert!(index.query("what is the return window", 3).is_empty());
    }

    #[test]
    fn test_query_ranks_relevant_doc_first() {
        let index = FaqIndex::new();
        assert_eq!(index.len(), 5);
        let snippets = index.query("can I return a refund for my purchase", 2);
        assert!(!snippets.is_empty());
        assert_eq!(snippets[0].metadata["category"], "return_policy");
    }

    #[test]
    fn test_top_k_is_respected() {
        let index = FaqIndex::new();
        let snippets = index.query("delivery order beverage points", 1);
        assert!(snippets.len() <= 1);
    }

    #[test]
    fn test_no_overlap_returns_nothing() {
        let index = FaqIndex::new();
        assert!(index.query("zzzz qqqq xxxx", 3).is_empty());
    }

    #[test]
    fn test_tokenize_dedupes_and_lowercases() {
        assert_eq!(tokenize("Coffee, coffee COFFEE!"), vec!["coffee"]);
    }
}
