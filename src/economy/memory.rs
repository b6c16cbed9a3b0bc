use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::{CollectionStore, EconomyService};
use crate::shared::AppError;

/// Per-user currency balances
#[derive(Debug, Clone, Default)]
pub struct Wallet {
    pub coins: i64,
    pub coupons: i64,
    pub rare_candy: i64,
}

/// One recorded coin mutation. A wallet change and its ledger entry are
/// applied under the same lock, so they always move together.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub currency: String,
    pub amount: i64,
    pub reason: String,
}

#[derive(Default)]
struct EconomyState {
    wallets: HashMap<String, Wallet>,
    ledger: HashMap<String, Vec<LedgerEntry>>,
}

/// In-memory implementation of the economy collaborator for development
/// and testing. Balances are lost on restart.
pub struct InMemoryEconomyService {
    state: Mutex<EconomyState>,
}

impl Default for InMemoryEconomyService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEconomyService {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EconomyState::default()),
        }
    }

    /// Sets a user's coin balance directly (test/dev convenience)
    pub async fn set_coins(&self, user_id: &str, coins: i64) {
        let mut state = self.state.lock().unwrap();
        state.wallets.entry(user_id.to_string()).or_default().coins = coins;
    }

    pub async fn coins(&self, user_id: &str) -> i64 {
        self.wallet(user_id).coins
    }

    pub async fn coupons(&self, user_id: &str) -> i64 {
        self.wallet(user_id).coupons
    }

    pub async fn rare_candy(&self, user_id: &str) -> i64 {
        self.wallet(user_id).rare_candy
    }

    pub async fn ledger_entries(&self, user_id: &str) -> Vec<LedgerEntry> {
        let state = self.state.lock().unwrap();
        state.ledger.get(user_id).cloned().unwrap_or_default()
    }

    fn wallet(&self, user_id: &str) -> Wallet {
        self.state
            .lock()
            .unwrap()
            .wallets
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl EconomyService for InMemoryEconomyService {
    #[instrument(skip(self, note))]
    async fn spend_coins(
        &self,
        user_id: &str,
        amount: i64,
        reason: &str,
        note: &str,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let wallet = state.wallets.entry(user_id.to_string()).or_default();

        if wallet.coins < amount {
            warn!(
                user_id = %user_id,
                balance = wallet.coins,
                amount = amount,
                "Insufficient coins for debit"
            );
            return Err(AppError::InsufficientFunds(format!(
                "Need {} coins, have {}",
                amount, wallet.coins
            )));
        }
        wallet.coins -= amount;
        let balance = wallet.coins;

        state
            .ledger
            .entry(user_id.to_string())
            .or_default()
            .push(LedgerEntry {
                currency: "coins".to_string(),
                amount: -amount,
                reason: reason.to_string(),
            });

        debug!(
            user_id = %user_id,
            amount = amount,
            reason = %reason,
            balance = balance,
            "Coins debited"
        );
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
        let mut state = self.state.lock().unwrap();
        let wallet = state.wallets.entry(user_id.to_string()).or_default();
        wallet.coins += amount;
        let balance = wallet.coins;

        state
            .ledger
            .entry(user_id.to_string())
            .or_default()
            .push(LedgerEntry {
                currency: "coins".to_string(),
                amount,
                reason: reason.to_string(),
            });

        debug!(
            user_id = %user_id,
            amount = amount,
            reason = %reason,
            balance = balance,
            "Coins credited"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_coupons(&self, user_id: &str, amount: i64) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let wallet = state.wallets.entry(user_id.to_string()).or_default();
        wallet.coupons += amount;

        debug!(user_id = %user_id, amount = amount, "Coupons credited");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_rare_candy(&self, user_id: &str, amount: i64) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let wallet = state.wallets.entry(user_id.to_string()).or_default();
        wallet.rare_candy += amount;

        debug!(user_id = %user_id, amount = amount, "Rare candy credited");
        Ok(())
    }
}

#[derive(Default)]
struct CollectionState {
    // (user_id, card_def_id) -> quantity
    cards: HashMap<(String, String), i64>,
    skins: HashSet<(String, String)>,
    card_backs: HashSet<(String, String)>,
    coins: HashSet<(String, String)>,
    avatars: HashSet<(String, String)>,
}

/// In-memory implementation of the collection collaborator
pub struct InMemoryCollectionStore {
    state: Mutex<CollectionState>,
}

impl Default for InMemoryCollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CollectionState::default()),
        }
    }

    pub async fn card_quantity(&self, user_id: &str, card_def_id: &str) -> i64 {
        let state = self.state.lock().unwrap();
        state
            .cards
            .get(&(user_id.to_string(), card_def_id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub async fn has_skin(&self, user_id: &str, skin_id: &str) -> bool {
        let state = self.state.lock().unwrap();
        state
            .skins
            .contains(&(user_id.to_string(), skin_id.to_string()))
    }

    pub async fn has_card_back(&self, user_id: &str, card_back_id: &str) -> bool {
        let state = self.state.lock().unwrap();
        state
            .card_backs
            .contains(&(user_id.to_string(), card_back_id.to_string()))
    }

    pub async fn has_collectible_coin(&self, user_id: &str, coin_id: &str) -> bool {
        let state = self.state.lock().unwrap();
        state
            .coins
            .contains(&(user_id.to_string(), coin_id.to_string()))
    }

    pub async fn has_avatar(&self, user_id: &str, avatar_id: &str) -> bool {
        let state = self.state.lock().unwrap();
        state
            .avatars
            .contains(&(user_id.to_string(), avatar_id.to_string()))
    }

    /// Total number of distinct grants held, across all cosmetic kinds
    pub async fn grant_count(&self, user_id: &str) -> usize {
        let state = self.state.lock().unwrap();
        [
            &state.skins,
            &state.card_backs,
            &state.coins,
            &state.avatars,
        ]
        .iter()
        .map(|set| set.iter().filter(|(uid, _)| uid == user_id).count())
        .sum()
    }
}

#[async_trait]
impl CollectionStore for InMemoryCollectionStore {
    #[instrument(skip(self))]
    async fn add_card(&self, user_id: &str, card_def_id: &str) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let quantity = state
            .cards
            .entry((user_id.to_string(), card_def_id.to_string()))
            .or_insert(0);
        *quantity += 1;

        debug!(user_id = %user_id, card_def_id = %card_def_id, quantity = *quantity, "Card added to collection");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn grant_skin(&self, user_id: &str, skin_id: &str) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let granted = state
            .skins
            .insert((user_id.to_string(), skin_id.to_string()));

        debug!(user_id = %user_id, skin_id = %skin_id, newly_granted = granted, "Skin grant handled");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn grant_card_back(&self, user_id: &str, card_back_id: &str) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let granted = state
            .card_backs
            .insert((user_id.to_string(), card_back_id.to_string()));

        debug!(user_id = %user_id, card_back_id = %card_back_id, newly_granted = granted, "Card back grant handled");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn grant_collectible_coin(&self, user_id: &str, coin_id: &str) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let granted = state
            .coins
            .insert((user_id.to_string(), coin_id.to_string()));

        debug!(user_id = %user_id, coin_id = %coin_id, newly_granted = granted, "Collectible coin grant handled");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn grant_avatar(&self, user_id: &str, avatar_id: &str) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let granted = state
            .avatars
            .insert((user_id.to_string(), avatar_id.to_string()));

        debug!(user_id = %user_id, avatar_id = %avatar_id, newly_granted = granted, "Avatar grant handled");
        Ok(())
    }
}
