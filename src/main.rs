//! GatherBuddy event registration service
//!
//! Main application entry point

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use GatherBuddy::{
    config::Settings,
    database::{self, DatabaseService},
    handlers::{create_router, AppState},
    i18n::I18n,
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard keeps the file writer alive
    let _logging_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", GatherBuddy::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = database::DatabaseConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        acquire_timeout: Duration::from_secs(30),
        idle_timeout: Some(Duration::from_secs(600)),
        max_lifetime: Some(Duration::from_secs(1800)),
    };
    let pool = database::create_pool(&db_config).await?;

    // Run database migrations
    database::run_migrations(&pool).await?;

    // Initialize i18n system
    info!("Loading translations...");
    let mut i18n = I18n::new(&settings.i18n);
    i18n.load_translations().await?;

    // Initialize services
    info!("Initializing services...");
    let database_service = DatabaseService::new(pool.clone());
    let services = ServiceFactory::new(&settings, database_service)?;

    let state = Arc::new(AppState {
        services,
        i18n,
        pool,
    });
    let router = create_router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("GatherBuddy listening on {}", addr);

    axum::serve(listener, router).await?;

    info!("GatherBuddy has been shut down.");
    Ok(())
}
