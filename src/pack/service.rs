use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::draw::DrawEngine;
use super::models::{PackDefinition, PackOpeningResult};
use super::repository::PackRepository;
use super::types::{PackCreateRequest, PackSummary, PackUpdateRequest};
use crate::catalog::CatalogProvider;
use crate::economy::{CollectionStore, EconomyService};
use crate::limits::{DailyLimitStatus, DailyLimitTracker, DAILY_PACK_LIMIT};
use crate::shared::AppError;

/// Reason code recorded against pack purchase debits
const PACK_PURCHASE_REASON: &str = "PACK_PURCHASE";

/// Service for pack registry administration and the pack-open flow
pub struct PackService {
    repository: Arc<dyn PackRepository + Send + Sync>,
    engine: DrawEngine,
    economy: Arc<dyn EconomyService + Send + Sync>,
    collection: Arc<dyn CollectionStore + Send + Sync>,
    daily_limits: Arc<DailyLimitTracker>,
}

impl PackService {
    pub fn new(
        repository: Arc<dyn PackRepository + Send + Sync>,
        catalog: Arc<dyn CatalogProvider + Send + Sync>,
        economy: Arc<dyn EconomyService + Send + Sync>,
        collection: Arc<dyn CollectionStore + Send + Sync>,
        daily_limits: Arc<DailyLimitTracker>,
    ) -> Self {
        let engine = DrawEngine::new(Arc::clone(&repository), catalog);
        Self {
            repository,
            engine,
            economy,
            collection,
            daily_limits,
        }
    }

    /// Lists all packs as admin-safe summaries
    #[instrument(skip(self))]
    pub async fn list_packs(&self) -> Result<Vec<PackSummary>, AppError> {
        let packs = self.repository.list_packs().await?;
        debug!(pack_count = packs.len(), "Packs listed");
        Ok(packs.iter().map(PackSummary::from).collect())
    }

    /// Gets the full definition of a single pack
    #[instrument(skip(self))]
    pub async fn get_pack(&self, pack_id: &str) -> Result<PackDefinition, AppError> {
        self.repository
            .get_pack(pack_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pack '{}' not found", pack_id)))
    }

    /// Creates a new pack definition after validating the payload
    #[instrument(skip(self, request))]
    pub async fn create_pack(
        &self,
        request: PackCreateRequest,
    ) -> Result<PackDefinition, AppError> {
        validate_create(&request)?;

        let def = request.into_definition();
        self.repository.create_pack(&def).await?;

        info!(pack_id = %def.id, name = %def.name, "Pack created");
        Ok(def)
    }

    /// Applies a partial update; the pack id is immutable
    #[instrument(skip(self, patch))]
    pub async fn update_pack(
        &self,
        pack_id: &str,
        patch: PackUpdateRequest,
    ) -> Result<PackDefinition, AppError> {
        validate_patch(&patch)?;

        let updated = self.repository.update_pack(pack_id, &patch).await?;
        info!(pack_id = %pack_id, "Pack updated");
        Ok(updated)
    }

    /// Deletes a pack, returning whether it existed
    #[instrument(skip(self))]
    pub async fn delete_pack(&self, pack_id: &str) -> Result<bool, AppError> {
        let existed = self.repository.delete_pack(pack_id).await?;
        info!(pack_id = %pack_id, existed = existed, "Pack delete handled");
        Ok(existed)
    }

    /// Today's pack-open allowance for a user
    #[instrument(skip(self))]
    pub fn limit_status(&self, user_id: &str) -> DailyLimitStatus {
        self.daily_limits.status(user_id)
    }

    /// Full pack-open flow for an authenticated user: daily-limit gate,
    /// coin charge, draw, collection persist, limit record.
    ///
    /// There is no transaction spanning these steps; a crash after the
    /// charge can lose the draw. Accepted risk, matching the original
    /// system's behavior.
    #[instrument(skip(self))]
    pub async fn open_pack_for_user(
        &self,
        user_id: &str,
        pack_id: &str,
    ) -> Result<PackOpeningResult, AppError> {
        let def = self.get_pack(pack_id).await?;
        if !def.available {
            return Err(AppError::Unavailable(format!(
                "Pack '{}' is not available",
                pack_id
            )));
        }

        let status = self.daily_limits.status(user_id);
        if !status.can_open {
            warn!(user_id = %user_id, pack_id = %pack_id, "Daily pack limit reached");
            return Err(AppError::LimitReached(format!(
                "Daily limit of {} packs reached",
                DAILY_PACK_LIMIT
            )));
        }

        if let Some(price) = def.price.filter(|p| *p > 0) {
            self.economy
                .spend_coins(
                    user_id,
                    price,
                    PACK_PURCHASE_REASON,
                    &format!("Opened pack '{}'", pack_id),
                )
                .await?;
        }

        let result = self.engine.open(pack_id).await?;

        for drawn in &result.cards {
            self.collection.add_card(user_id, &drawn.card.id).await?;
        }

        self.daily_limits.record(user_id);

        info!(
            user_id = %user_id,
            pack_id = %pack_id,
            cards_drawn = result.cards.len(),
            "Pack opened for user"
        );
        Ok(result)
    }
}

fn validate_create(request: &PackCreateRequest) -> Result<(), AppError> {
    if request.id.trim().is_empty() {
        return Err(AppError::Validation("Pack id is required".to_string()));
    }
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Pack name is required".to_string()));
    }
    if request.set_id.trim().is_empty() {
        return Err(AppError::Validation("Pack set id is required".to_string()));
    }
    if request.slots.is_empty() {
        return Err(AppError::Validation(
            "Pack must define at least one slot".to_string(),
        ));
    }
    validate_slots(&request.slots)
}

fn validate_patch(patch: &PackUpdateRequest) -> Result<(), AppError> {
    if let Some(slots) = &patch.slots {
        if slots.is_empty() {
            return Err(AppError::Validation(
                "Pack must define at least one slot".to_string(),
            ));
        }
        validate_slots(slots)?;
    }
    Ok(())
}

fn validate_slots(slots: &[super::models::SlotSpec]) -> Result<(), AppError> {
    for slot in slots {
        if slot.count == 0 {
            return Err(AppError::Validation(
                "Slot count must be positive".to_string(),
            ));
        }
        for chance in [slot.holo_chance, slot.upgrade_chance].into_iter().flatten() {
            if !(0.0..=1.0).contains(&chance) {
                return Err(AppError::Validation(
                    "Slot chances must lie within [0, 1]".to_string(),
                ));
            }
        }
    }
    Ok(())
}
