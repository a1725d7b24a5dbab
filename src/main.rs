// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, and start HTTP server

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use portfolio_api::config::{self, Config};
use portfolio_api::errors::set_expose_details;
use portfolio_api::handlers;
use portfolio_api::services::{start_cleanup_task, start_limiter_cleanup_task, LoginLimiter, SessionStore};
use std::io;
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            &config.log_level
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    set_expose_details(config.is_development());

    log::info!("Starting portfolio-api...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Sessions and login throttling
    let sessions = Arc::new(SessionStore::new(Duration::from_secs(
        config.session_ttl_minutes * 60,
    )));
    start_cleanup_task(sessions.clone(), 300);
    log::info!(
        "Initialized session store (idle timeout: {} minutes)",
        config.session_ttl_minutes
    );

    let limiter = Arc::new(LoginLimiter::new(
        config.login_max_attempts,
        Duration::from_secs(config.login_window_minutes * 60),
    ));
    start_limiter_cleanup_task(limiter.clone(), 600);
    log::info!(
        "Login limit: {} attempts per {} minutes",
        config.login_max_attempts,
        config.login_window_minutes
    );

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_clone = config.clone();

    HttpServer::new(move || {
        App::new()
            // Application state
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_clone.clone()))
            .app_data(web::Data::from(sessions.clone()))
            .app_data(web::Data::from(limiter.clone()))
            .app_data(handlers::json_config())
            .app_data(handlers::query_config())
            .app_data(handlers::path_config())
            // Middleware
            .wrap(handlers::cors_headers(&config_clone.cors_allowed_origin))
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::configure)
    })
    .bind(&server_addr)?
    .run()
    .await
}
