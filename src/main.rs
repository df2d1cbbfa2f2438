use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use valex::api::{self, AppState};
use valex::config::Config;
use valex::db;
use valex::services::{
    card_repository::PgCardRepository, card_service::CardService,
    company::PgCompanyAuthorizer, crypto::Argon2SecretHasher, employee::PgEmployeeDirectory,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "valex=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Valex server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let card_service = CardService::new(
        Arc::new(PgCompanyAuthorizer::new(pool.clone())),
        Arc::new(PgEmployeeDirectory::new(pool.clone())),
        Arc::new(PgCardRepository::new(pool.clone())),
        Arc::new(Argon2SecretHasher::new(config.secret_pepper.clone())),
    );

    let app = api::app(AppState::new(card_service));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    // Start server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received, cleaning up...");
}
