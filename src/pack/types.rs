use serde::{Deserialize, Serialize};

use super::models::{PackDefinition, SlotSpec};

/// Admin-safe projection of a pack definition for listings. Slot
/// composition (the drop rates) stays server-side.
#[derive(Debug, Serialize, Deserialize)]
pub struct PackSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub set_id: String,
    pub card_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    pub available: bool,
}

impl From<&PackDefinition> for PackSummary {
    fn from(def: &PackDefinition) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            description: def.description.clone(),
            set_id: def.set_id.clone(),
            card_count: def.card_count,
            price: def.price,
            available: def.available,
        }
    }
}

/// Request payload for creating a new pack definition
#[derive(Debug, Deserialize)]
pub struct PackCreateRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub set_id: String,
    pub card_count: u32,
    pub slots: Vec<SlotSpec>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl PackCreateRequest {
    pub fn into_definition(self) -> PackDefinition {
        PackDefinition {
            id: self.id,
            name: self.name,
            description: self.description,
            set_id: self.set_id,
            card_count: self.card_count,
            slots: self.slots,
            price: self.price,
            available: self.available,
        }
    }
}

/// Partial update payload. An `id` field is accepted but never applied;
/// pack ids are immutable.
#[derive(Debug, Default, Deserialize)]
pub struct PackUpdateRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub set_id: Option<String>,
    pub card_count: Option<u32>,
    pub slots: Option<Vec<SlotSpec>>,
    pub price: Option<i64>,
    pub available: Option<bool>,
}
