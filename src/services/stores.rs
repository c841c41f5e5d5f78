use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConciergeError, Result};

/// A store record. `distance_m` is filled per request from the caller's
/// location; it is 0.0 when no location was supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub opening_hours: String,
    pub is_open_now: bool,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    #[serde(default)]
    pub distance_m: f64,
}

/// The store shape returned to façade callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSummary {
    pub id: String,
    pub name: String,
    pub distance_m: f64,
    pub rating: Option<f64>,
    pub is_open_now: Option<bool>,
}

impl StoreSummary {
    pub fn from_store(store: &Store) -> Self {
        Self {
            id: store.id.clone(),
            name: store.name.clone(),
            distance_m: store.distance_m,
            rating: store.rating,
            is_open_now: Some(store.is_open_now),
        }
    }
}

/// Pure data-fetch collaborator: returns candidate stores near a location,
/// sorted by distance.
pub struct StoreLocator {
    catalog: Vec<Store>,
}

impl StoreLocator {
    /// Locator over the built-in demo catalog.
    pub fn new() -> Self {
        Self {
            catalog: demo_catalog(),
        }
    }

    pub fn with_catalog(catalog: Vec<Store>) -> Self {
        Self { catalog }
    }

    /// Load a catalog from a YAML file (a sequence of store records).
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let catalog: Vec<Store> =
            serde_yaml::from_str(&contents).map_err(|e| ConciergeError::StoreCatalog {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self { catalog })
    }

    /// Candidate stores with per-request distances, nearest first.
    pub fn nearby(&self, lat: Option<f64>, lng: Option<f64>) -> Vec<Store> {
        let mut stores = self.catalog.clone();
        for store in &mut stores {
            store.distance_m = match (lat, lng) {
                (Some(lat), Some(lng)) => haversine_distance_m(lat, lng, store.lat, store.lng),
                _ => 0.0,
            };
        }
        stores.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        stores
    }
}

impl Default for StoreLocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Great-circle distance in meters between two lat/lng pairs.
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

fn demo_catalog() -> Vec<Store> {
    vec![
        Store {
            id: "store_101".into(),
            name: "Starbucks MG Road".into(),
            lat: 12.9717,
            lng: 77.5948,
            opening_hours: "08:00-22:00".into(),
            is_open_now: true,
            rating: Some(4.4),
            review_count: Some(892),
            distance_m: 0.0,
        },
        Store {
            id: "store_102".into(),
            name: "Third Wave Coffee Church Street".into(),
            lat: 12.9730,
            lng: 77.6050,
            opening_hours: "09:00-23:00".into(),
            is_open_now: false,
            rating: Some(4.6),
            review_count: Some(650),
            distance_m: 0.0,
        },
    ]
}
