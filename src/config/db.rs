// src/config/db.rs
// DOCUMENTATION: Database connection pool initialization
// PURPOSE: Setup and manage the MySQL connection pool

use crate::config::Config;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;

/// Initialize MySQL connection pool
/// DOCUMENTATION: Called once during application startup in main.rs
/// Returns the pool used for all database operations
pub async fn init_db_pool(config: &Config) -> Result<MySqlPool, sqlx::Error> {
    log::info!("Initializing database pool");

    let pool = pool_options(config)
        .connect(&config.database_url)
        .await?;

    // Verify connection works
    sqlx::query("SELECT 1").execute(&pool).await?;

    log::info!("Database pool initialized successfully");
    Ok(pool)
}

/// Build a pool that only connects on first use
/// Used by handler tests that never reach the database
pub fn init_lazy_pool(config: &Config) -> Result<MySqlPool, sqlx::Error> {
    pool_options(config).connect_lazy(&config.database_url)
}

fn pool_options(config: &Config) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connection_timeout))
        // Connection idle timeout (5 minutes)
        .idle_timeout(Duration::from_secs(300))
        // Connection lifetime (30 minutes before recycle)
        .max_lifetime(Duration::from_secs(1800))
}
