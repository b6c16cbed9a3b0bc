// Library crate for the card game reward service
// This file exposes the public API for integration tests

pub mod auth;
pub mod catalog;
pub mod economy;
pub mod limits;
pub mod pack;
pub mod shared;
pub mod wheel;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// Re-export commonly used types for easier access in tests
pub use catalog::{Card, CardKind, CatalogProvider, Rarity};
pub use limits::{DailyLimitTracker, DAILY_PACK_LIMIT};
pub use pack::{DrawEngine, PackDefinition, PackOpeningResult, SlotSpec};
pub use shared::{AppError, AppState};
pub use wheel::{ResolvedPrize, WheelService};

/// Builds the full application router. Pack CRUD is the admin surface;
/// opening, spinning, and claiming require a bearer token.
pub fn build_router(state: AppState) -> Router {
    let authenticated = Router::new()
        .route("/packs/limit/status", get(pack::limit_status))
        .route("/packs/:id/open", post(pack::open_pack))
        .route("/wheel/spin", post(wheel::spin_wheel))
        .route("/wheel/claim", post(wheel::claim_prize))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/packs", get(pack::list_packs))
        .route("/packs", post(pack::create_pack))
        .route("/packs/:id", get(pack::get_pack))
        .route("/packs/:id", put(pack::update_pack))
        .route("/packs/:id", delete(pack::delete_pack))
        .merge(authenticated)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
