// Public API - what other modules can use
pub use draw::{DrawEngine, ENERGY_TOP_UP_COUNT, STANDARD_BOOSTER_IDS};
pub use handlers::{
    create_pack, delete_pack, get_pack, limit_status, list_packs, open_pack, update_pack,
};
pub use models::{DrawnCard, PackDefinition, PackOpeningResult, SlotSpec, SlotType};
pub use service::PackService;
pub use types::{PackCreateRequest, PackSummary, PackUpdateRequest};

// Internal modules
mod draw;
mod handlers;
pub mod models;
pub mod repository;
mod service;
mod types;
