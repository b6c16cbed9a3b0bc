use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Card rarity tiers. `RareHolo` sits one tier above `Rare` and is the
/// target of holo upgrades during pack draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    RareHolo,
}

impl Rarity {
    /// Promotes one tier. `RareHolo` is terminal and promotes to itself.
    pub fn promote(self) -> Self {
        match self {
            Rarity::Common => Rarity::Uncommon,
            Rarity::Uncommon => Rarity::Rare,
            Rarity::Rare => Rarity::RareHolo,
            Rarity::RareHolo => Rarity::RareHolo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CardKind {
    Creature,
    Trainer,
    Energy,
}

/// Immutable catalog entry for a single card printing within a set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub kind: CardKind,
    pub rarity: Rarity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_type: Option<String>,
}

impl Card {
    pub fn is_energy(&self) -> bool {
        self.kind == CardKind::Energy
    }
}
