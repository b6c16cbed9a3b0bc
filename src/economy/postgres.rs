use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument, warn};

use super::{CollectionStore, EconomyService};
use crate::shared::AppError;

/// PostgreSQL implementation of the economy collaborator.
///
/// Debits are conditional updates so a balance can never go negative.
/// A coin mutation and its ledger entry commit in one transaction, so
/// the ledger and the balances never disagree.
pub struct PostgresEconomyService {
    pool: PgPool,
}

impl PostgresEconomyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'_, Postgres>, AppError> {
        self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to begin wallet transaction");
            AppError::DatabaseError(e.to_string())
        })
    }

    async fn append_ledger(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: &str,
        currency: &str,
        amount: i64,
        reason: &str,
        note: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO currency_ledger (user_id, currency, amount, reason, note, created_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user_id)
        .bind(currency)
        .bind(amount)
        .bind(reason)
        .bind(note)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to append ledger entry");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }
}

#[async_trait]
impl EconomyService for PostgresEconomyService {
    #[instrument(skip(self, note))]
    async fn spend_coins(
        &self,
        user_id: &str,
        amount: i64,
        reason: &str,
        note: &str,
    ) -> Result<(), AppError> {
        let mut tx = self.begin().await?;

        let result = sqlx::query(
            "UPDATE wallets SET coins = coins - $2 WHERE user_id = $1 AND coins >= $2",
        )
        .bind(user_id)
        .bind(amount)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to debit coins");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(user_id = %user_id, amount = amount, "Insufficient coins for debit");
            return Err(AppError::InsufficientFunds(format!(
                "Need {} coins",
                amount
            )));
        }

        self.append_ledger(&mut tx, user_id, "coins", -amount, reason, note)
            .await?;

        // Errors above drop the transaction and roll the debit back
        tx.commit().await.map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to commit debit");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(user_id = %user_id, amount = amount, reason = %reason, "Coins debited");
        Ok(())
    }

    #[instrument(skip(self, note))]
    async fn add_coins(
        &self,
        user_id: &str,
        amount: i64,
        reason: &str,
        note: &str,
    ) -> Result<(), AppError> {
        let mut tx = self.begin().await?;

        sqlx::query(
            "INSERT INTO wallets (user_id, coins) VALUES ($1, $2) ON CONFLICT (user_id) DO UPDATE SET coins = wallets.coins + $2",
        )
        .bind(user_id)
        .bind(amount)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to credit coins");
            AppError::DatabaseError(e.to_string())
        })?;

        self.append_ledger(&mut tx, user_id, "coins", amount, reason, note)
            .await?;

        tx.commit().await.map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to commit credit");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(user_id = %user_id, amount = amount, reason = %reason, "Coins credited");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_coupons(&self, user_id: &str, amount: i64) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO wallets (user_id, coupons) VALUES ($1, $2) ON CONFLICT (user_id) DO UPDATE SET coupons = wallets.coupons + $2",
        )
        .bind(user_id)
        .bind(amount)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to credit coupons");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(user_id = %user_id, amount = amount, "Coupons credited");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_rare_candy(&self, user_id: &str, amount: i64) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO wallets (user_id, rare_candy) VALUES ($1, $2) ON CONFLICT (user_id) DO UPDATE SET rare_candy = wallets.rare_candy + $2",
        )
        .bind(user_id)
        .bind(amount)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to credit rare candy");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(user_id = %user_id, amount = amount, "Rare candy credited");
        Ok(())
    }
}

/// PostgreSQL implementation of the collection collaborator. Card upserts
/// and cosmetic grants rely on `ON CONFLICT` for their idempotency.
pub struct PostgresCollectionStore {
    pool: PgPool,
}

impl PostgresCollectionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn grant(&self, table: &str, column: &str, user_id: &str, item_id: &str) -> Result<(), AppError> {
        // Table and column names come from the fixed call sites below,
        // never from request data.
        let sql = format!(
            "INSERT INTO {table} (user_id, {column}, granted_at) VALUES ($1, $2, $3) ON CONFLICT (user_id, {column}) DO NOTHING",
        );

        sqlx::query(&sql)
            .bind(user_id)
            .bind(item_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = %user_id, table = %table, "Failed to grant item");
                AppError::DatabaseError(e.to_string())
            })?;

        debug!(user_id = %user_id, item_id = %item_id, table = %table, "Grant handled");
        Ok(())
    }
}

#[async_trait]
impl CollectionStore for PostgresCollectionStore {
    #[instrument(skip(self))]
    async fn add_card(&self, user_id: &str, card_def_id: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO user_cards (user_id, card_def_id, quantity) VALUES ($1, $2, 1) ON CONFLICT (user_id, card_def_id) DO UPDATE SET quantity = user_cards.quantity + 1",
        )
        .bind(user_id)
        .bind(card_def_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, card_def_id = %card_def_id, "Failed to upsert card");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(user_id = %user_id, card_def_id = %card_def_id, "Card added to collection");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn grant_skin(&self, user_id: &str, skin_id: &str) -> Result<(), AppError> {
        self.grant("user_skins", "skin_id", user_id, skin_id).await
    }

    #[instrument(skip(self))]
    async fn grant_card_back(&self, user_id: &str, card_back_id: &str) -> Result<(), AppError> {
        self.grant("user_card_backs", "card_back_id", user_id, card_back_id)
            .await
    }

    #[instrument(skip(self))]
    async fn grant_collectible_coin(&self, user_id: &str, coin_id: &str) -> Result<(), AppError> {
        self.grant("user_collectible_coins", "coin_id", user_id, coin_id)
            .await
    }

    #[instrument(skip(self))]
    async fn grant_avatar(&self, user_id: &str, avatar_id: &str) -> Result<(), AppError> {
        self.grant("user_avatars", "avatar_id", user_id, avatar_id)
            .await
    }
}
