#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use storefront::config::settings::AppConfig;
use storefront::config::{database, seed};
use storefront::errors::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Make it non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = AppConfig::from_env()
        .inspect_err(|e| error!("Failed to load application configuration: {e}"))?;
    info!("Successfully processed application configuration.");

    // 4. Initialize database
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to the database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Seed categories and the bootstrap admin (if necessary)
    // SEED_ADMIN_PASSWORD is loaded here, directly before use, not stored in AppConfig
    let seed_config = seed::load_config(&app_config.seed_config_path)
        .inspect_err(|e| error!("Failed to load seed configuration: {e}"))?;
    let admin_password = std::env::var("SEED_ADMIN_PASSWORD").ok();
    seed::seed_database(&db, &seed_config, admin_password.as_deref())
        .await
        .inspect(|_| info!("Seed data applied."))
        .inspect_err(|e| error!("Failed to seed the database: {e}"))?;

    info!("Store prepared; schema and seed data are in place.");
    Ok(())
}
