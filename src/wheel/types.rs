use serde::{Deserialize, Serialize};

/// A fully formed wheel prize, produced by the upstream spin-outcome
/// selector and handed to the resolver for persistence.
///
/// Closed tagged union: each kind carries exactly the fields it needs, so
/// a payload with missing required fields is rejected at deserialization
/// instead of being silently reinterpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolvedPrize {
    Coins {
        amount: i64,
    },
    Card {
        card_def_id: String,
    },
    Overlay {
        skin_id: String,
    },
    CardBack {
        card_back_id: String,
    },
    CollectibleCoin {
        coin_id: String,
    },
    Avatar {
        avatar_id: String,
    },
    FreePack,
    SpinAgain {
        /// Ignored by the resolver; credited by the caller if at all
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bonus_coins: Option<i64>,
    },
    Jackpot {
        prizes: Vec<ResolvedPrize>,
    },
    Nothing,
}

/// Response for a paid spin. The outcome itself arrives via the separate
/// claim call; paying and claiming are decoupled by design.
#[derive(Debug, Serialize, Deserialize)]
pub struct SpinResponse {
    pub charged: i64,
}

/// Request payload for claiming a resolved prize
#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub prize: ResolvedPrize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub claimed: bool,
}
