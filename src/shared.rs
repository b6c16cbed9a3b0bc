use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::TokenConfig;
use crate::catalog::CatalogProvider;
use crate::economy::{CollectionStore, EconomyService};
use crate::limits::DailyLimitTracker;
use crate::pack::repository::PackRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub pack_repository: Arc<dyn PackRepository + Send + Sync>,
    pub catalog: Arc<dyn CatalogProvider + Send + Sync>,
    pub economy: Arc<dyn EconomyService + Send + Sync>,
    pub collection: Arc<dyn CollectionStore + Send + Sync>,
    pub daily_limits: Arc<DailyLimitTracker>,
    pub token_config: TokenConfig,
}

impl AppState {
    pub fn new(
        pack_repository: Arc<dyn PackRepository + Send + Sync>,
        catalog: Arc<dyn CatalogProvider + Send + Sync>,
        economy: Arc<dyn EconomyService + Send + Sync>,
        collection: Arc<dyn CollectionStore + Send + Sync>,
        daily_limits: Arc<DailyLimitTracker>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            pack_repository,
            catalog,
            economy,
            collection,
            daily_limits,
            token_config,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Daily limit reached: {0}")]
    LimitReached(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Stable machine-readable code carried in every error response body
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Unavailable(_) => "UNAVAILABLE",
            AppError::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::LimitReached(_) => "DAILY_LIMIT_REACHED",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Internal => "INTERNAL",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::FORBIDDEN,
            AppError::InsufficientFunds(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::LimitReached(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let code = self.code();
        // Internal details stay out of response bodies
        let message = match &self {
            AppError::DatabaseError(_) | AppError::Internal => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "message": message,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::auth::TokenConfig;
    use crate::catalog::InMemoryCatalogProvider;
    use crate::economy::{InMemoryCollectionStore, InMemoryEconomyService};
    use crate::limits::DailyLimitTracker;
    use crate::pack::repository::InMemoryPackRepository;

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        pack_repository: Option<Arc<dyn PackRepository + Send + Sync>>,
        catalog: Option<Arc<dyn CatalogProvider + Send + Sync>>,
        economy: Option<Arc<dyn EconomyService + Send + Sync>>,
        collection: Option<Arc<dyn CollectionStore + Send + Sync>>,
        daily_limits: Option<Arc<DailyLimitTracker>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                pack_repository: None,
                catalog: None,
                economy: None,
                collection: None,
                daily_limits: None,
            }
        }

        pub fn with_pack_repository(mut self, repo: Arc<dyn PackRepository + Send + Sync>) -> Self {
            self.pack_repository = Some(repo);
            self
        }

        pub fn with_catalog(mut self, catalog: Arc<dyn CatalogProvider + Send + Sync>) -> Self {
            self.catalog = Some(catalog);
            self
        }

        pub fn with_economy(mut self, economy: Arc<dyn EconomyService + Send + Sync>) -> Self {
            self.economy = Some(economy);
            self
        }

        pub fn with_collection(
            mut self,
            collection: Arc<dyn CollectionStore + Send + Sync>,
        ) -> Self {
            self.collection = Some(collection);
            self
        }

        pub fn with_daily_limits(mut self, limits: Arc<DailyLimitTracker>) -> Self {
            self.daily_limits = Some(limits);
            self
        }

        pub fn build(self) -> AppState {
            AppState {
                pack_repository: self
                    .pack_repository
                    .unwrap_or_else(|| Arc::new(InMemoryPackRepository::seeded())),
                catalog: self
                    .catalog
                    .unwrap_or_else(|| Arc::new(InMemoryCatalogProvider::seeded())),
                economy: self
                    .economy
                    .unwrap_or_else(|| Arc::new(InMemoryEconomyService::new())),
                collection: self
                    .collection
                    .unwrap_or_else(|| Arc::new(InMemoryCollectionStore::new())),
                daily_limits: self
                    .daily_limits
                    .unwrap_or_else(|| Arc::new(DailyLimitTracker::new())),
                token_config: TokenConfig::new(),
            }
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
