use chrono::Utc;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::models::{DrawnCard, PackDefinition, PackOpeningResult, SlotSpec, SlotType};
use super::repository::PackRepository;
use crate::catalog::{Card, CatalogProvider, Rarity, DEFAULT_SET_ID};
use crate::shared::AppError;

/// Pack ids that receive the fixed 2-card energy top-up on open
pub const STANDARD_BOOSTER_IDS: [&str; 2] = ["base-set-booster", "jungle-booster"];

/// Energy cards appended to every standard booster
pub const ENERGY_TOP_UP_COUNT: usize = 2;

/// Produces concrete card draws for a pack definition.
///
/// Per-draw evaluation order is fixed: the holo roll happens first, then a
/// triggered upgrade roll overwrites the target rarity. Changing this order
/// changes drop-rate statistics, so it is deliberate and load-bearing.
pub struct DrawEngine {
    packs: Arc<dyn PackRepository + Send + Sync>,
    catalog: Arc<dyn CatalogProvider + Send + Sync>,
}

impl DrawEngine {
    pub fn new(
        packs: Arc<dyn PackRepository + Send + Sync>,
        catalog: Arc<dyn CatalogProvider + Send + Sync>,
    ) -> Self {
        Self { packs, catalog }
    }

    /// Opens a pack: `NotFound` for an unknown id, `Unavailable` when the
    /// pack is disabled. Empty candidate pools skip the draw silently, so
    /// the result may hold fewer cards than the nominal count.
    #[instrument(skip(self))]
    pub async fn open(&self, pack_id: &str) -> Result<PackOpeningResult, AppError> {
        let def = self
            .packs
            .get_pack(pack_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pack '{}' not found", pack_id)))?;

        if !def.available {
            return Err(AppError::Unavailable(format!(
                "Pack '{}' is not available",
                pack_id
            )));
        }

        let set_cards = self.catalog.cards_for_set(&def.set_id).await?;
        let energy_pool = self.energy_pool(&def).await?;

        // All I/O is done; the rng never crosses an await point below.
        let mut rng = rand::rng();
        let mut cards: Vec<DrawnCard> = Vec::with_capacity(def.card_count as usize);

        for slot in &def.slots {
            for _ in 0..slot.count {
                let (target, forced_holo) = roll_target(&mut rng, slot);
                let pool = candidate_pool(&set_cards, target);

                if pool.is_empty() {
                    warn!(
                        pack_id = %def.id,
                        set_id = %def.set_id,
                        target = %target,
                        "Empty candidate pool, skipping draw"
                    );
                    continue;
                }

                if let Some(card) = pool.choose(&mut rng) {
                    let is_holo = forced_holo || card.rarity == Rarity::RareHolo;
                    cards.push(DrawnCard {
                        card: (*card).clone(),
                        slot_type: SlotType::from(target),
                        is_holo,
                    });
                }
            }
        }

        if let Some(energy_pool) = &energy_pool {
            if energy_pool.is_empty() {
                warn!(pack_id = %def.id, "No energy cards available for top-up");
            } else {
                for _ in 0..ENERGY_TOP_UP_COUNT {
                    if let Some(card) = energy_pool.choose(&mut rng) {
                        cards.push(DrawnCard {
                            card: card.clone(),
                            slot_type: SlotType::Energy,
                            is_holo: false,
                        });
                    }
                }
            }
        }

        debug!(
            pack_id = %def.id,
            drawn = cards.len(),
            nominal = def.card_count,
            "Pack opened"
        );

        Ok(PackOpeningResult {
            pack_id: def.id,
            cards,
            opened_at: Utc::now(),
        })
    }

    /// Energy pool for the top-up, or `None` for packs that get no top-up.
    /// Falls back to the default set when the pack's own set has no energy.
    async fn energy_pool(&self, def: &PackDefinition) -> Result<Option<Vec<Card>>, AppError> {
        if !STANDARD_BOOSTER_IDS.contains(&def.id.as_str()) {
            return Ok(None);
        }

        let mut energy: Vec<Card> = self
            .catalog
            .cards_for_set(&def.set_id)
            .await?
            .into_iter()
            .filter(|c| c.is_energy())
            .collect();

        if energy.is_empty() && def.set_id != DEFAULT_SET_ID {
            debug!(
                pack_id = %def.id,
                set_id = %def.set_id,
                "Set has no energy cards, falling back to default set"
            );
            energy = self
                .catalog
                .cards_for_set(DEFAULT_SET_ID)
                .await?
                .into_iter()
                .filter(|c| c.is_energy())
                .collect();
        }

        Ok(Some(energy))
    }
}

/// Rolls a single draw's target rarity.
///
/// Holo first: a rare slot with `holo_chance` may retarget to rare-holo
/// with the holo flag forced. Then the upgrade roll, which on trigger
/// overwrites the target with the slot rarity promoted one tier.
fn roll_target<R: Rng>(rng: &mut R, slot: &SlotSpec) -> (Rarity, bool) {
    let mut target = slot.rarity;
    let mut forced_holo = false;

    if slot.rarity == Rarity::Rare {
        if let Some(chance) = slot.holo_chance {
            if rng.random_bool(chance.clamp(0.0, 1.0)) {
                target = Rarity::RareHolo;
                forced_holo = true;
            }
        }
    }

    if let Some(chance) = slot.upgrade_chance {
        if rng.random_bool(chance.clamp(0.0, 1.0)) {
            target = slot.rarity.promote();
        }
    }

    (target, forced_holo)
}

/// Candidate pool for a target rarity. A plain `rare` target draws from
/// rare and rare-holo entries alike; a `rare-holo` target (forced or
/// upgraded) is restricted to holo entries; everything else exact-matches.
fn candidate_pool(cards: &[Card], target: Rarity) -> Vec<&Card> {
    match target {
        Rarity::RareHolo => cards
            .iter()
            .filter(|c| c.rarity == Rarity::RareHolo)
            .collect(),
        Rarity::Rare => cards
            .iter()
            .filter(|c| matches!(c.rarity, Rarity::Rare | Rarity::RareHolo))
            .collect(),
        rarity => cards.iter().filter(|c| c.rarity == rarity).collect(),
    }
}
