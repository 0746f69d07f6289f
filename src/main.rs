use profile_insights::config::Config;
use profile_insights::database::create_pool;
use profile_insights::redis::RedisClient;
use profile_insights::services::settings_service;
use profile_insights::store::postgres::PgStore;
use profile_insights::{AppState, create_app};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "profile_insights=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let db = create_pool(&config).await?;
    tracing::info!("Database connection pool created");
    let store = Arc::new(PgStore::new(db));

    // Create Redis client
    let cache = Arc::new(RedisClient::new(&config.redis_url).await?);
    tracing::info!("Redis client created");

    // Dashboard settings are read once; admin saves replace them in place
    let settings = settings_service::load_settings(&*store, &config.settings_option_name).await?;
    tracing::info!(per_page = settings.per_page, "Dashboard settings loaded");

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(store, cache, config, settings);

    // Create application
    let app = create_app(state);

    // Create listener
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
