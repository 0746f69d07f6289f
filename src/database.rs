use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

use crate::config::Config;

/// Connects with the pool size from `DATABASE_MAX_CONNECTIONS`.
pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .connect(&config.database_url)
        .await?;

    tracing::debug!(
        max_connections = config.database_max_connections,
        "Postgres pool ready"
    );
    Ok(pool)
}
