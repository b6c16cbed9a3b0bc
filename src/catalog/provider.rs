use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::models::{Card, CardKind, Rarity};
use super::DEFAULT_SET_ID;
use crate::shared::AppError;

/// Trait for the card catalog collaborator. The reward engine only ever
/// reads from the catalog; the pool per set is immutable at runtime.
#[async_trait]
pub trait CatalogProvider {
    /// Returns the full ordered card pool for a set, or an empty vector
    /// for an unknown set id.
    async fn cards_for_set(&self, set_id: &str) -> Result<Vec<Card>, AppError>;
}

/// In-memory catalog backed by a plain map, for development and testing.
/// A database-backed catalog is a drop-in replacement behind the trait.
pub struct InMemoryCatalogProvider {
    sets: HashMap<String, Vec<Card>>,
}

impl InMemoryCatalogProvider {
    pub fn new(sets: HashMap<String, Vec<Card>>) -> Self {
        Self { sets }
    }

    /// Catalog used by a fresh process: the base set (with energy cards)
    /// and the jungle set (no energy, relies on the base-set fallback).
    pub fn seeded() -> Self {
        let mut sets = HashMap::new();
        sets.insert(DEFAULT_SET_ID.to_string(), base_set());
        sets.insert("jungle".to_string(), jungle_set());
        Self { sets }
    }
}

#[async_trait]
impl CatalogProvider for InMemoryCatalogProvider {
    #[instrument(skip(self))]
    async fn cards_for_set(&self, set_id: &str) -> Result<Vec<Card>, AppError> {
        let cards = self.sets.get(set_id).cloned().unwrap_or_default();
        debug!(set_id = %set_id, card_count = cards.len(), "Fetched set from catalog");
        Ok(cards)
    }
}

fn card(id: &str, name: &str, kind: CardKind, rarity: Rarity) -> Card {
    Card {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        rarity,
        energy_type: None,
    }
}

fn energy(id: &str, name: &str, energy_type: &str) -> Card {
    Card {
        id: id.to_string(),
        name: name.to_string(),
        kind: CardKind::Energy,
        rarity: Rarity::Common,
        energy_type: Some(energy_type.to_string()),
    }
}

fn base_set() -> Vec<Card> {
    vec![
        card("bs-001", "Emberling", CardKind::Creature, Rarity::Common),
        card("bs-002", "Puddlefin", CardKind::Creature, Rarity::Common),
        card("bs-003", "Sproutle", CardKind::Creature, Rarity::Common),
        card("bs-004", "Rockpup", CardKind::Creature, Rarity::Common),
        card("bs-005", "Potion", CardKind::Trainer, Rarity::Common),
        card("bs-101", "Blazehound", CardKind::Creature, Rarity::Uncommon),
        card("bs-102", "Tidecaller", CardKind::Creature, Rarity::Uncommon),
        card("bs-103", "Switch", CardKind::Trainer, Rarity::Uncommon),
        card("bs-201", "Pyrelord", CardKind::Creature, Rarity::Rare),
        card("bs-202", "Abyssal Drake", CardKind::Creature, Rarity::Rare),
        card("bs-301", "Pyrelord Prime", CardKind::Creature, Rarity::RareHolo),
        card("bs-302", "Verdant Titan", CardKind::Creature, Rarity::RareHolo),
        energy("bs-energy-fire", "Fire Energy", "fire"),
        energy("bs-energy-water", "Water Energy", "water"),
        energy("bs-energy-grass", "Grass Energy", "grass"),
    ]
}

// Jungle deliberately ships no energy cards; standard boosters drawn from
// it top up from the base-set energy pool instead.
fn jungle_set() -> Vec<Card> {
    vec![
        card("jg-001", "Vinewhip", CardKind::Creature, Rarity::Common),
        card("jg-002", "Mossling", CardKind::Creature, Rarity::Common),
        card("jg-003", "Thorn Rat", CardKind::Creature, Rarity::Common),
        card("jg-101", "Canopy Stalker", CardKind::Creature, Rarity::Uncommon),
        card("jg-102", "Bloomwing", CardKind::Creature, Rarity::Uncommon),
        card("jg-201", "Jungle Monarch", CardKind::Creature, Rarity::Rare),
        card("jg-301", "Jungle Monarch Prime", CardKind::Creature, Rarity::RareHolo),
    ]
}
