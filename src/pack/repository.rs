use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{PackDefinition, SlotSpec};
use super::types::PackUpdateRequest;
use crate::catalog::{Rarity, DEFAULT_SET_ID};
use crate::shared::AppError;

/// Trait for pack registry operations
#[async_trait]
pub trait PackRepository {
    async fn list_packs(&self) -> Result<Vec<PackDefinition>, AppError>;
    async fn get_pack(&self, pack_id: &str) -> Result<Option<PackDefinition>, AppError>;
    /// Fails with `Conflict` if a pack with the same id already exists
    async fn create_pack(&self, def: &PackDefinition) -> Result<(), AppError>;
    /// Merges the patch into an existing definition. The stored id is
    /// immutable regardless of what the patch contains.
    async fn update_pack(
        &self,
        pack_id: &str,
        patch: &PackUpdateRequest,
    ) -> Result<PackDefinition, AppError>;
    /// Returns whether a record existed
    async fn delete_pack(&self, pack_id: &str) -> Result<bool, AppError>;
}

/// In-memory implementation of PackRepository. Registry state is volatile
/// by design; a store-backed registry is a drop-in replacement as long as
/// the same contract holds.
pub struct InMemoryPackRepository {
    packs: Mutex<HashMap<String, PackDefinition>>,
}

impl Default for InMemoryPackRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPackRepository {
    /// Creates a new empty in-memory registry
    pub fn new() -> Self {
        Self {
            packs: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a registry pre-populated with the stock pack lineup so a
    /// fresh process is immediately playable
    pub fn seeded() -> Self {
        let repo = Self::new();
        {
            let mut packs = repo.packs.lock().unwrap();
            for def in stock_packs() {
                packs.insert(def.id.clone(), def);
            }
        }
        repo
    }

    /// Returns the current number of registered packs
    pub fn pack_count(&self) -> usize {
        self.packs.lock().unwrap().len()
    }
}

#[async_trait]
impl PackRepository for InMemoryPackRepository {
    #[instrument(skip(self))]
    async fn list_packs(&self) -> Result<Vec<PackDefinition>, AppError> {
        let packs = self.packs.lock().unwrap();
        let mut list: Vec<PackDefinition> = packs.values().cloned().collect();
        // HashMap iteration order is arbitrary; keep listings stable
        list.sort_by(|a, b| a.id.cmp(&b.id));

        debug!(pack_count = list.len(), "Packs listed from registry");
        Ok(list)
    }

    #[instrument(skip(self))]
    async fn get_pack(&self, pack_id: &str) -> Result<Option<PackDefinition>, AppError> {
        let packs = self.packs.lock().unwrap();
        let pack = packs.get(pack_id).cloned();

        match &pack {
            Some(p) => debug!(pack_id = %pack_id, name = %p.name, "Pack found in registry"),
            None => debug!(pack_id = %pack_id, "Pack not found in registry"),
        }

        Ok(pack)
    }

    #[instrument(skip(self, def))]
    async fn create_pack(&self, def: &PackDefinition) -> Result<(), AppError> {
        let mut packs = self.packs.lock().unwrap();
        if packs.contains_key(&def.id) {
            warn!(pack_id = %def.id, "Pack already exists in registry");
            return Err(AppError::Conflict(format!(
                "Pack '{}' already exists",
                def.id
            )));
        }
        packs.insert(def.id.clone(), def.clone());

        debug!(pack_id = %def.id, "Pack created in registry");
        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn update_pack(
        &self,
        pack_id: &str,
        patch: &PackUpdateRequest,
    ) -> Result<PackDefinition, AppError> {
        let mut packs = self.packs.lock().unwrap();
        let def = packs.get_mut(pack_id).ok_or_else(|| {
            warn!(pack_id = %pack_id, "Pack not found for update");
            AppError::NotFound(format!("Pack '{}' not found", pack_id))
        })?;

        if let Some(id) = &patch.id {
            if id != pack_id {
                warn!(pack_id = %pack_id, requested_id = %id, "Ignoring id change in pack update");
            }
        }
        if let Some(name) = &patch.name {
            def.name = name.clone();
        }
        if let Some(description) = &patch.description {
            def.description = description.clone();
        }
        if let Some(set_id) = &patch.set_id {
            def.set_id = set_id.clone();
        }
        if let Some(card_count) = patch.card_count {
            def.card_count = card_count;
        }
        if let Some(slots) = &patch.slots {
            def.slots = slots.clone();
        }
        if let Some(price) = patch.price {
            def.price = Some(price);
        }
        if let Some(available) = patch.available {
            def.available = available;
        }

        debug!(pack_id = %pack_id, "Pack updated in registry");
        Ok(def.clone())
    }

    #[instrument(skip(self))]
    async fn delete_pack(&self, pack_id: &str) -> Result<bool, AppError> {
        let mut packs = self.packs.lock().unwrap();
        let existed = packs.remove(pack_id).is_some();

        debug!(pack_id = %pack_id, existed = existed, "Pack delete attempted");
        Ok(existed)
    }
}

/// The stock lineup: the two standard boosters (which get the energy
/// top-up on open) plus a premium holo pack.
fn stock_packs() -> Vec<PackDefinition> {
    vec![
        PackDefinition {
            id: "base-set-booster".to_string(),
            name: "Base Set Booster".to_string(),
            description: "11 cards from the base set, including a guaranteed rare".to_string(),
            set_id: DEFAULT_SET_ID.to_string(),
            card_count: 11,
            slots: vec![
                SlotSpec::new(Rarity::Common, 5).with_upgrade_chance(0.02),
                SlotSpec::new(Rarity::Uncommon, 3).with_upgrade_chance(0.1),
                SlotSpec::new(Rarity::Rare, 1).with_holo_chance(0.33),
            ],
            price: Some(100),
            available: true,
        },
        PackDefinition {
            id: "jungle-booster".to_string(),
            name: "Jungle Booster".to_string(),
            description: "11 cards from the jungle expansion".to_string(),
            set_id: "jungle".to_string(),
            card_count: 11,
            slots: vec![
                SlotSpec::new(Rarity::Common, 5).with_upgrade_chance(0.02),
                SlotSpec::new(Rarity::Uncommon, 3).with_upgrade_chance(0.1),
                SlotSpec::new(Rarity::Rare, 1).with_holo_chance(0.33),
            ],
            price: Some(120),
            available: true,
        },
        PackDefinition {
            id: "holo-collector".to_string(),
            name: "Holo Collector Pack".to_string(),
            description: "3 rare cards, each a coin flip away from holo".to_string(),
            set_id: DEFAULT_SET_ID.to_string(),
            card_count: 3,
            slots: vec![SlotSpec::new(Rarity::Rare, 3).with_holo_chance(0.5)],
            price: Some(350),
            available: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_pack(id: &str) -> PackDefinition {
        PackDefinition {
            id: id.to_string(),
            name: format!("Pack {}", id),
            description: String::new(),
            set_id: DEFAULT_SET_ID.to_string(),
            card_count: 5,
            slots: vec![SlotSpec::new(Rarity::Common, 5)],
            price: Some(50),
            available: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_pack() {
        let repo = InMemoryPackRepository::new();
        repo.create_pack(&test_pack("alpha")).await.unwrap();

        let fetched = repo.get_pack("alpha").await.unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().name, "Pack alpha");
    }

    #[tokio::test]
    async fn test_create_duplicate_id_fails_with_conflict() {
        let repo = InMemoryPackRepository::new();
        let mut original = test_pack("alpha");
        original.price = Some(75);
        repo.create_pack(&original).await.unwrap();

        let mut duplicate = test_pack("alpha");
        duplicate.price = Some(999);
        let result = repo.create_pack(&duplicate).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        // Existing definition is untouched
        let stored = repo.get_pack("alpha").await.unwrap().unwrap();
        assert_eq!(stored.price, Some(75));
    }

    #[tokio::test]
    async fn test_update_merges_fields_and_preserves_id() {
        let repo = InMemoryPackRepository::new();
        repo.create_pack(&test_pack("alpha")).await.unwrap();

        let patch = PackUpdateRequest {
            id: Some("renamed".to_string()),
            name: Some("New Name".to_string()),
            available: Some(false),
            ..Default::default()
        };
        let updated = repo.update_pack("alpha", &patch).await.unwrap();

        assert_eq!(updated.id, "alpha");
        assert_eq!(updated.name, "New Name");
        assert!(!updated.available);
        // Untouched fields survive the merge
        assert_eq!(updated.price, Some(50));
        assert!(repo.get_pack("renamed").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_pack_fails_with_not_found() {
        let repo = InMemoryPackRepository::new();
        let patch = PackUpdateRequest::default();
        let result = repo.update_pack("ghost", &patch).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let repo = InMemoryPackRepository::new();
        repo.create_pack(&test_pack("alpha")).await.unwrap();

        assert!(repo.delete_pack("alpha").await.unwrap());
        assert!(!repo.delete_pack("alpha").await.unwrap());
        assert!(repo.get_pack("alpha").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seeded_registry_contains_standard_boosters() {
        let repo = InMemoryPackRepository::seeded();
        assert_eq!(repo.pack_count(), 3);
        for id in ["base-set-booster", "jungle-booster", "holo-collector"] {
            assert!(repo.get_pack(id).await.unwrap().is_some(), "missing {}", id);
        }
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_id() {
        let repo = InMemoryPackRepository::new();
        repo.create_pack(&test_pack("zeta")).await.unwrap();
        repo.create_pack(&test_pack("alpha")).await.unwrap();

        let ids: Vec<String> = repo
            .list_packs()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }
}
