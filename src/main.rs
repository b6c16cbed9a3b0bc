use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use boosterbox::auth::TokenConfig;
use boosterbox::catalog::InMemoryCatalogProvider;
use boosterbox::economy::{InMemoryCollectionStore, InMemoryEconomyService};
use boosterbox::limits::{start_sweep_task, DailyLimitTracker, SweepConfig};
use boosterbox::pack::repository::InMemoryPackRepository;
use boosterbox::{build_router, AppState};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boosterbox=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting card game reward service");

    // Create shared application state with dependency injection
    // Easy to switch between implementations:
    let pack_repository = Arc::new(InMemoryPackRepository::seeded());
    let catalog = Arc::new(InMemoryCatalogProvider::seeded());
    let economy = Arc::new(InMemoryEconomyService::new());
    let collection = Arc::new(InMemoryCollectionStore::new());

    // For production with PostgreSQL:
    // let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    // let pool = sqlx::PgPool::connect(&database_url).await.expect("Failed to connect to database");
    // let economy = Arc::new(boosterbox::economy::PostgresEconomyService::new(pool.clone()));
    // let collection = Arc::new(boosterbox::economy::PostgresCollectionStore::new(pool));

    let daily_limits = Arc::new(DailyLimitTracker::new());

    let app_state = AppState::new(
        pack_repository,
        catalog,
        economy,
        collection,
        Arc::clone(&daily_limits),
        TokenConfig::new(),
    );

    // Periodic sweep keeps the daily-limit map bounded
    tokio::spawn(start_sweep_task(daily_limits, SweepConfig::default()));

    let app = build_router(app_state);

    // run our app with hyper, listening globally on port 3000
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
