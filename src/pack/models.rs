use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::catalog::{Card, Rarity};

/// One draw rule inside a pack: how many independent draws to make at a
/// rarity, and the optional holo / tier-upgrade probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotSpec {
    pub rarity: Rarity,
    pub count: u32,
    /// Probability in [0, 1] that a rare draw is retargeted to rare-holo.
    /// Only meaningful on `rare` slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holo_chance: Option<f64>,
    /// Probability in [0, 1] that a draw is promoted one rarity tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_chance: Option<f64>,
}

impl SlotSpec {
    pub fn new(rarity: Rarity, count: u32) -> Self {
        Self {
            rarity,
            count,
            holo_chance: None,
            upgrade_chance: None,
        }
    }

    pub fn with_holo_chance(mut self, chance: f64) -> Self {
        self.holo_chance = Some(chance);
        self
    }

    pub fn with_upgrade_chance(mut self, chance: f64) -> Self {
        self.upgrade_chance = Some(chance);
        self
    }
}

/// A purchasable booster pack definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub set_id: String,
    pub card_count: u32,
    pub slots: Vec<SlotSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    pub available: bool,
}

/// The realized slot of a drawn card: the post-upgrade rarity, or the
/// energy top-up appended to standard boosters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SlotType {
    Common,
    Uncommon,
    Rare,
    RareHolo,
    Energy,
}

impl From<Rarity> for SlotType {
    fn from(rarity: Rarity) -> Self {
        match rarity {
            Rarity::Common => SlotType::Common,
            Rarity::Uncommon => SlotType::Uncommon,
            Rarity::Rare => SlotType::Rare,
            Rarity::RareHolo => SlotType::RareHolo,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawnCard {
    pub card: Card,
    pub slot_type: SlotType,
    pub is_holo: bool,
}

/// Immutable outcome of opening one pack. Persisting the drawn cards to
/// the player's collection is the caller's job, not the engine's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackOpeningResult {
    pub pack_id: String,
    pub cards: Vec<DrawnCard>,
    pub opened_at: DateTime<Utc>,
}
