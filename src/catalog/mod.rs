// Public API - what other modules can use
pub use models::{Card, CardKind, Rarity};
pub use provider::{CatalogProvider, InMemoryCatalogProvider};

/// Set every fresh deployment ships with; also the fallback energy pool
/// for standard boosters whose own set carries no energy cards.
pub const DEFAULT_SET_ID: &str = "base-set";

// Internal modules
mod models;
mod provider;
