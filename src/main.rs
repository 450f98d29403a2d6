use dotenvy::dotenv;
use time_ledger::{
    config::{categories, database},
    core::category,
    errors::Result,
};
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

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the category seed configuration
    let config = categories::load_default_config()
        .inspect_err(|e| error!("Failed to load config.toml: {}", e))?;

    // 4. Connect and make sure every table exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed the category tree on first start
    let seeded = category::seed_categories(&db, &config.categories)
        .await
        .inspect_err(|e| error!("Failed to seed categories: {}", e))?;
    if seeded > 0 {
        info!(seeded, "Initial categories seeded.");
    }

    info!(url = %database::get_database_url(), "Time ledger is ready.");
    Ok(())
}
