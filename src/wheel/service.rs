use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::types::ResolvedPrize;
use crate::economy::{CollectionStore, EconomyService};
use crate::shared::AppError;

/// Fixed coin cost of one wheel spin, charged before the outcome exists
pub const SPIN_COST: i64 = 100;

/// Coin credit standing in for an actual pack draw on a free-pack prize
pub const FREE_PACK_COIN_VALUE: i64 = 200;

/// Coupon currency granted alongside every jackpot
pub const JACKPOT_COUPON_BONUS: i64 = 100;

/// Nested jackpots beyond this depth are dropped. The upstream prize
/// generator is expected to bound nesting; this is the backstop.
const MAX_JACKPOT_DEPTH: usize = 8;

const SPIN_REASON: &str = "WHEEL_SPIN";
const PRIZE_REASON: &str = "WHEEL_PRIZE";

/// Persists wheel prizes to a player's account
pub struct WheelService {
    economy: Arc<dyn EconomyService + Send + Sync>,
    collection: Arc<dyn CollectionStore + Send + Sync>,
}

impl WheelService {
    pub fn new(
        economy: Arc<dyn EconomyService + Send + Sync>,
        collection: Arc<dyn CollectionStore + Send + Sync>,
    ) -> Self {
        Self {
            economy,
            collection,
        }
    }

    /// Debits the fixed spin cost. Runs before any outcome is generated;
    /// claiming the prize is a separate, later call.
    #[instrument(skip(self))]
    pub async fn pay_spin(&self, user_id: &str) -> Result<(), AppError> {
        self.economy
            .spend_coins(user_id, SPIN_COST, SPIN_REASON, "Prize wheel spin")
            .await?;

        info!(user_id = %user_id, cost = SPIN_COST, "Spin paid");
        Ok(())
    }

    /// Persists a prize's effects. Never fails on a well-formed prize;
    /// `spin_again` and `nothing` are explicit no-ops.
    #[instrument(skip(self, prize))]
    pub async fn resolve(&self, user_id: &str, prize: &ResolvedPrize) -> Result<(), AppError> {
        self.resolve_at_depth(user_id, prize, 0).await
    }

    fn resolve_at_depth<'a>(
        &'a self,
        user_id: &'a str,
        prize: &'a ResolvedPrize,
        depth: usize,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        async move {
            match prize {
                ResolvedPrize::Coins { amount } => {
                    if *amount > 0 {
                        self.economy
                            .add_coins(user_id, *amount, PRIZE_REASON, "Wheel coin prize")
                            .await?;
                    } else {
                        debug!(user_id = %user_id, "Zero-amount coin prize skipped");
                    }
                }
                ResolvedPrize::Card { card_def_id } => {
                    self.collection.add_card(user_id, card_def_id).await?;
                }
                ResolvedPrize::Overlay { skin_id } => {
                    self.collection.grant_skin(user_id, skin_id).await?;
                }
                ResolvedPrize::CardBack { card_back_id } => {
                    self.collection.grant_card_back(user_id, card_back_id).await?;
                }
                ResolvedPrize::CollectibleCoin { coin_id } => {
                    self.collection
                        .grant_collectible_coin(user_id, coin_id)
                        .await?;
                }
                ResolvedPrize::Avatar { avatar_id } => {
                    self.collection.grant_avatar(user_id, avatar_id).await?;
                }
                ResolvedPrize::FreePack => {
                    // Credited in coins in lieu of an actual pack draw
                    self.economy
                        .add_coins(
                            user_id,
                            FREE_PACK_COIN_VALUE,
                            PRIZE_REASON,
                            "Free pack prize",
                        )
                        .await?;
                }
                ResolvedPrize::Jackpot { prizes } => {
                    if depth >= MAX_JACKPOT_DEPTH {
                        warn!(
                            user_id = %user_id,
                            depth = depth,
                            "Jackpot nesting beyond depth cap, dropping bundle"
                        );
                        return Ok(());
                    }

                    self.economy.add_rare_candy(user_id, 1).await?;
                    self.economy
                        .add_coupons(user_id, JACKPOT_COUPON_BONUS)
                        .await?;

                    for nested in prizes {
                        self.resolve_at_depth(user_id, nested, depth + 1).await?;
                    }
                }
                // The resolver ignores bonus_coins on spin_again; any
                // credit for it is the caller's separate concern.
                ResolvedPrize::SpinAgain { .. } | ResolvedPrize::Nothing => {
                    debug!(user_id = %user_id, "Prize with no persistent effect");
                }
            }

            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::{InMemoryCollectionStore, InMemoryEconomyService};

    struct TestHarness {
        service: WheelService,
        economy: Arc<InMemoryEconomyService>,
        collection: Arc<InMemoryCollectionStore>,
    }

    fn harness() -> TestHarness {
        let economy = Arc::new(InMemoryEconomyService::new());
        let collection = Arc::new(InMemoryCollectionStore::new());
        let service = WheelService::new(
            Arc::clone(&economy) as Arc<dyn EconomyService + Send + Sync>,
            Arc::clone(&collection) as Arc<dyn CollectionStore + Send + Sync>,
        );
        TestHarness {
            service,
            economy,
            collection,
        }
    }

    #[tokio::test]
    async fn test_pay_spin_debits_fixed_cost() {
        let h = harness();
        h.economy.set_coins("user-1", 250).await;

        h.service.pay_spin("user-1").await.unwrap();
        assert_eq!(h.economy.coins("user-1").await, 250 - SPIN_COST);
    }

    #[tokio::test]
    async fn test_pay_spin_propagates_insufficient_funds() {
        let h = harness();
        h.economy.set_coins("user-1", SPIN_COST - 1).await;

        let result = h.service.pay_spin("user-1").await;
        assert!(matches!(result, Err(AppError::InsufficientFunds(_))));
    }

    #[tokio::test]
    async fn test_coin_prize_credits_amount() {
        let h = harness();
        h.service
            .resolve("user-1", &ResolvedPrize::Coins { amount: 75 })
            .await
            .unwrap();
        assert_eq!(h.economy.coins("user-1").await, 75);
    }

    #[tokio::test]
    async fn test_zero_coin_prize_is_skipped() {
        let h = harness();
        h.service
            .resolve("user-1", &ResolvedPrize::Coins { amount: 0 })
            .await
            .unwrap();
        assert_eq!(h.economy.coins("user-1").await, 0);
    }

    #[tokio::test]
    async fn test_card_prize_upserts_collection() {
        let h = harness();
        let prize = ResolvedPrize::Card {
            card_def_id: "bs-301".to_string(),
        };
        h.service.resolve("user-1", &prize).await.unwrap();
        h.service.resolve("user-1", &prize).await.unwrap();

        assert_eq!(h.collection.card_quantity("user-1", "bs-301").await, 2);
    }

    #[tokio::test]
    async fn test_cosmetic_prizes_grant_once() {
        let h = harness();
        let prize = ResolvedPrize::Overlay {
            skin_id: "gold-frame".to_string(),
        };
        h.service.resolve("user-1", &prize).await.unwrap();
        h.service.resolve("user-1", &prize).await.unwrap();

        assert!(h.collection.has_skin("user-1", "gold-frame").await);
        assert_eq!(h.collection.grant_count("user-1").await, 1);
    }

    #[tokio::test]
    async fn test_free_pack_credits_fallback_coins() {
        let h = harness();
        h.service
            .resolve("user-1", &ResolvedPrize::FreePack)
            .await
            .unwrap();
        assert_eq!(h.economy.coins("user-1").await, FREE_PACK_COIN_VALUE);
    }

    #[tokio::test]
    async fn test_jackpot_resolves_three_effects() {
        let h = harness();
        let prize = ResolvedPrize::Jackpot {
            prizes: vec![ResolvedPrize::Coins { amount: 50 }],
        };
        h.service.resolve("user-1", &prize).await.unwrap();

        assert_eq!(h.economy.rare_candy("user-1").await, 1);
        assert_eq!(h.economy.coupons("user-1").await, JACKPOT_COUPON_BONUS);
        assert_eq!(h.economy.coins("user-1").await, 50);
    }

    #[tokio::test]
    async fn test_jackpot_resolves_nested_prizes_in_order() {
        let h = harness();
        let prize = ResolvedPrize::Jackpot {
            prizes: vec![
                ResolvedPrize::Coins { amount: 10 },
                ResolvedPrize::Avatar {
                    avatar_id: "champ".to_string(),
                },
                ResolvedPrize::Nothing,
            ],
        };
        h.service.resolve("user-1", &prize).await.unwrap();

        assert_eq!(h.economy.coins("user-1").await, 10);
        assert!(h.collection.has_avatar("user-1", "champ").await);
    }

    #[tokio::test]
    async fn test_nested_jackpot_grants_bonuses_per_level() {
        let h = harness();
        let prize = ResolvedPrize::Jackpot {
            prizes: vec![ResolvedPrize::Jackpot {
                prizes: vec![ResolvedPrize::Coins { amount: 5 }],
            }],
        };
        h.service.resolve("user-1", &prize).await.unwrap();

        assert_eq!(h.economy.rare_candy("user-1").await, 2);
        assert_eq!(h.economy.coupons("user-1").await, 2 * JACKPOT_COUPON_BONUS);
        assert_eq!(h.economy.coins("user-1").await, 5);
    }

    #[tokio::test]
    async fn test_jackpot_depth_cap_drops_deep_bundles() {
        let h = harness();
        // Nested one level past the cap; the innermost coins never land
        let mut prize = ResolvedPrize::Coins { amount: 1000 };
        for _ in 0..(MAX_JACKPOT_DEPTH + 1) {
            prize = ResolvedPrize::Jackpot {
                prizes: vec![prize],
            };
        }

        h.service.resolve("user-1", &prize).await.unwrap();
        assert_eq!(h.economy.coins("user-1").await, 0);
        // The cap drops the bundle, not the bonuses already granted
        assert_eq!(h.economy.rare_candy("user-1").await, MAX_JACKPOT_DEPTH as i64);
    }

    #[tokio::test]
    async fn test_no_effect_prizes_persist_nothing() {
        let h = harness();
        h.service
            .resolve("user-1", &ResolvedPrize::Nothing)
            .await
            .unwrap();
        h.service
            .resolve(
                "user-1",
                &ResolvedPrize::SpinAgain {
                    bonus_coins: Some(10),
                },
            )
            .await
            .unwrap();

        assert_eq!(h.economy.coins("user-1").await, 0);
        assert_eq!(h.collection.grant_count("user-1").await, 0);
    }
}
