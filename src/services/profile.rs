use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConciergeError, Result};

/// Loyalty tier; unknown labels fall back to Bronze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LoyaltyTier {
    #[default]
    Bronze,
    Silver,
    Gold,
}

impl LoyaltyTier {
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "gold" => LoyaltyTier::Gold,
            "silver" => LoyaltyTier::Silver,
            _ => LoyaltyTier::Bronze,
        }
    }

    pub fn discount_percent(&self) -> u32 {
        match self {
            LoyaltyTier::Gold => 15,
            LoyaltyTier::Silver => 10,
            LoyaltyTier::Bronze => 5,
        }
    }
}

impl std::fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoyaltyTier::Bronze => write!(f, "Bronze"),
            LoyaltyTier::Silver => write!(f, "Silver"),
            LoyaltyTier::Gold => write!(f, "Gold"),
        }
    }
}

/// The slim profile shape handed to the reasoning stages. Only what the
/// prompt context needs; the full record never leaves this module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightProfile {
    pub user_id: String,
    pub name: String,
    pub loyalty_tier: LoyaltyTier,
    pub favorite_tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    loyalty_tier: Option<LoyaltyTier>,
    #[serde(default)]
    favorite_tags: Vec<String>,
}

/// Lookup collaborator over a JSON user file keyed by user id.
pub struct UserDirectory {
    users: HashMap<String, UserRecord>,
}

impl UserDirectory {
    pub fn empty() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    /// Load the directory from a JSON object of user records. An absent file
    /// yields an empty directory; every lookup then falls back to a guest
    /// profile.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::empty());
        }
        let contents = std::fs::read_to_string(path)?;
        let users: HashMap<String, UserRecord> =
            serde_json::from_str(&contents).map_err(|e| ConciergeError::UserDirectory {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self { users })
    }

    /// Light profile for a user; unknown users get an anonymous guest
    /// profile rather than an error.
    pub fn light_profile(&self, user_id: &str) -> LightProfile {
        match self.users.get(user_id) {
            Some(record) => LightProfile {
                user_id: user_id.to_string(),
                name: record.name.clone().unwrap_or_else(|| "Guest".into()),
                loyalty_tier: record.loyalty_tier.unwrap_or_default(),
                favorite_tags: record.favorite_tags.clone(),
            },
            None => LightProfile {
                user_id: user_id.to_string(),
                name: "Guest".into(),
                loyalty_tier: LoyaltyTier::Bronze,
                favorite_tags: Vec::new(),
            },
        }
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::empty()
    }
}
