// Public API - what other modules can use
pub use memory::{InMemoryCollectionStore, InMemoryEconomyService, LedgerEntry, Wallet};
pub use postgres::{PostgresCollectionStore, PostgresEconomyService};

use async_trait::async_trait;

use crate::shared::AppError;

/// Currency collaborator. Credits are fire-and-forget and assumed not to
/// fail under normal operation; only `spend_coins` carries a real failure
/// mode (`InsufficientFunds`).
#[async_trait]
pub trait EconomyService {
    async fn spend_coins(
        &self,
        user_id: &str,
        amount: i64,
        reason: &str,
        note: &str,
    ) -> Result<(), AppError>;
    async fn add_coins(
        &self,
        user_id: &str,
        amount: i64,
        reason: &str,
        note: &str,
    ) -> Result<(), AppError>;
    async fn add_coupons(&self, user_id: &str, amount: i64) -> Result<(), AppError>;
    async fn add_rare_candy(&self, user_id: &str, amount: i64) -> Result<(), AppError>;
}

/// Collection collaborator. Card upserts increment quantity; cosmetic
/// grants are idempotent unique upserts (re-granting is a no-op).
#[async_trait]
pub trait CollectionStore {
    async fn add_card(&self, user_id: &str, card_def_id: &str) -> Result<(), AppError>;
    async fn grant_skin(&self, user_id: &str, skin_id: &str) -> Result<(), AppError>;
    async fn grant_card_back(&self, user_id: &str, card_back_id: &str) -> Result<(), AppError>;
    async fn grant_collectible_coin(&self, user_id: &str, coin_id: &str) -> Result<(), AppError>;
    async fn grant_avatar(&self, user_id: &str, avatar_id: &str) -> Result<(), AppError>;
}

// Internal modules
mod memory;
mod postgres;
