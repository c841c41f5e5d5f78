//! Laws of the masking/unmasking round-trip subsystem.

use std::collections::HashSet;

use serde_json::json;

use concierge::privacy::{unmask, MaskingEngine, MaskingTable, SensitiveCategory};

// ---------------------------------------------------------------------------
// Round-trip and idempotence laws
// ---------------------------------------------------------------------------

#[test]
fn round_trip_restores_original_exactly() {
    let engine = MaskingEngine::new();
    let original = "Call me at +91-98765-43210 or email ganesh@example.com, order ORD12345 is late.";

    let (masked, table) = engine.mask(original);
    assert_eq!(table.len(), 3);
    assert!(masked.contains("[PHONE_1]"));
    assert!(masked.contains("[EMAIL_1]"));
    assert!(masked.contains("[ORDER_1]"));
    assert!(!masked.contains("ganesh@example.com"));
    assert!(!masked.contains("98765"));
    assert!(!masked.contains("ORD12345"));

    assert_eq!(unmask(&masked, &table, None), original);
}

#[test]
fn tokens_appear_in_reading_order() {
    let engine = MaskingEngine::new();
    let (masked, _) = engine.mask("first +91-98765-43210 then +91-99999-11111");
    let p1 = masked.find("[PHONE_1]").unwrap();
    let p2 = masked.find("[PHONE_2]").unwrap();
    assert!(p1 < p2);
}

#[test]
fn remasking_masked_text_is_a_no_op() {
    let engine = MaskingEngine::new();
    let (masked, _) = engine.mask("Call +91-98765-43210 about ORDER_5678, mail a@b.com");

    let (remasked, second_table) = engine.mask(&masked);
    assert_eq!(remasked, masked);
    assert!(second_table.is_empty());
}

#[test]
fn mask_is_noop_on_clean_text() {
    let engine = MaskingEngine::new();
    let (masked, table) = engine.mask("hello world");
    assert_eq!(masked, "hello world");
    assert!(table.is_empty());
}

#[test]
fn mapping_size_equals_matched_spans() {
    let engine = MaskingEngine::new();
    let (_, table) = engine.mask(
        "numbers +91-98765-43210 and 080-4123-45678, mail a@b.com and c@d.org, order ORD1",
    );
    assert_eq!(table.len(), 5);
    let categories = table.categories();
    assert_eq!(categories.len(), 3);
}

// ---------------------------------------------------------------------------
// Selective disclosure
// ---------------------------------------------------------------------------

#[test]
fn restricted_unmask_restores_only_allowed_categories() {
    let engine = MaskingEngine::new();
    let original = "phone +91-98765-43210, mail ganesh@example.com, order ORD12345";
    let (masked, table) = engine.mask(original);

    let allowed: HashSet<SensitiveCategory> = [SensitiveCategory::Email].into();
    let partial = unmask(&masked, &table, Some(&allowed));

    assert!(partial.contains("ganesh@example.com"));
    assert!(partial.contains("[PHONE_1]"));
    assert!(partial.contains("[ORDER_1]"));
    assert!(!partial.contains("98765"));
}

#[test]
fn empty_allow_list_restores_nothing() {
    let engine = MaskingEngine::new();
    let (masked, table) = engine.mask("mail ganesh@example.com");

    let allowed: HashSet<SensitiveCategory> = HashSet::new();
    assert_eq!(unmask(&masked, &table, Some(&allowed)), masked);
}

#[test]
fn every_occurrence_of_a_token_is_replaced() {
    let engine = MaskingEngine::new();
    let (masked, table) = engine.mask("mail ganesh@example.com");
    let doubled = format!("{masked} and again {masked}");

    let restored = unmask(&doubled, &table, None);
    assert_eq!(
        restored,
        "mail ganesh@example.com and again mail ganesh@example.com"
    );
}

// ---------------------------------------------------------------------------
// Failure semantics
// ---------------------------------------------------------------------------

#[test]
fn unknown_token_is_preserved_verbatim() {
    let table = MaskingTable::new();
    assert_eq!(
        unmask("see [PHONE_99] later", &table, None),
        "see [PHONE_99] later"
    );
}

#[test]
fn organic_token_shaped_text_survives_the_round_trip() {
    // A user literally typing token syntax: never matched, never restored,
    // never dropped.
    let engine = MaskingEngine::new();
    let original = "I saw [PHONE_7] in your reply, mail me at a@b.com";
    let (masked, table) = engine.mask(original);

    assert_eq!(table.len(), 1);
    assert!(masked.contains("[PHONE_7]"));
    assert_eq!(unmask(&masked, &table, None), original);
}

// ---------------------------------------------------------------------------
// Structural masking
// ---------------------------------------------------------------------------

#[test]
fn structure_masking_tokenizes_every_string_leaf() {
    let engine = MaskingEngine::new();
    let value = json!({
        "message": "call +91-99999-11111",
        "user": {"email": "a@b.com"},
    });

    let (masked, table) = engine.mask_value(&value);
    assert_eq!(table.len(), 2);

    let message = masked["message"].as_str().unwrap();
    let email = masked["user"]["email"].as_str().unwrap();
    assert_eq!(message, "call [PHONE_1]");
    assert_eq!(email, "[EMAIL_1]");
}

#[test]
fn structure_masking_numbers_tokens_across_leaves() {
    // One mint threads through the whole walk, so same-category spans in
    // different leaves never collide in the merged table.
    let engine = MaskingEngine::new();
    let value = json!({
        "a": "+91-98765-43210",
        "b": {"c": "+91-99999-11111"},
    });

    let (_, table) = engine.mask_value(&value);
    assert_eq!(table.len(), 2);
    assert!(table.get("[PHONE_1]").is_some());
    assert!(table.get("[PHONE_2]").is_some());
}

#[test]
fn structure_masking_passes_non_string_leaves_through() {
    let engine = MaskingEngine::new();
    let value = json!({
        "count": 42,
        "flag": true,
        "nothing": null,
        "list": [1.5, "ORD12345"],
    });

    let (masked, table) = engine.mask_value(&value);
    assert_eq!(masked["count"], 42);
    assert_eq!(masked["flag"], true);
    assert_eq!(masked["nothing"], serde_json::Value::Null);
    assert_eq!(masked["list"][0], 1.5);
    assert_eq!(masked["list"][1], "[ORDER_1]");
    assert_eq!(table.len(), 1);
}

#[test]
fn structure_round_trip_restores_all_leaves() {
    let engine = MaskingEngine::new();
    let value = json!({
        "message": "call +91-99999-11111",
        "user": {"email": "a@b.com"},
    });

    let (masked, table) = engine.mask_value(&value);
    let message = unmask(masked["message"].as_str().unwrap(), &table, None);
    let email = unmask(masked["user"]["email"].as_str().unwrap(), &table, None);
    assert_eq!(message, "call +91-99999-11111");
    assert_eq!(email, "a@b.com");
}
