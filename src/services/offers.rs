use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::profile::LoyaltyTier;
use super::stores::Store;

/// A loyalty-aware offer for one store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub store_id: String,
    pub coupon_code: String,
    pub description: String,
    pub valid_till: NaiveDate,
    pub loyalty_tier: LoyaltyTier,
}

/// One offer per candidate store, discount keyed to the loyalty tier
/// (Bronze 5%, Silver 10%, Gold 15%), on hot beverages by default.
pub fn offers_for_stores(tier: LoyaltyTier, stores: &[Store]) -> Vec<Offer> {
    let discount = tier.discount_percent();
    let valid_till = end_of_year();
    stores
        .iter()
        .enumerate()
        .map(|(idx, store)| Offer {
            store_id: store.id.clone(),
            coupon_code: format!("HOT{}_{}", discount, idx + 1),
            description: format!("{discount}% off hot beverages"),
            valid_till,
            loyalty_tier: tier,
        })
        .collect()
}

fn end_of_year() -> NaiveDate {
    let today = Utc::now().date_naive();
    NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today)
}
