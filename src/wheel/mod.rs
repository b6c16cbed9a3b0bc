// Public API - what other modules can use
pub use handlers::{claim_prize, spin_wheel};
pub use service::{WheelService, FREE_PACK_COIN_VALUE, JACKPOT_COUPON_BONUS, SPIN_COST};
pub use types::{ClaimRequest, ClaimResponse, ResolvedPrize, SpinResponse};

// Internal modules
mod handlers;
mod service;
mod types;
