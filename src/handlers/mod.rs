// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export route configs and shared request plumbing

pub mod admin;
pub mod auth;
pub mod blog;
pub mod contact;
pub mod health;
pub mod projects;
pub mod settings;

pub use admin::config as admin_config;
pub use auth::{config as auth_config, AdminSession};
pub use blog::config as blog_config;
pub use contact::config as contact_config;
pub use health::config as health_config;
pub use projects::config as projects_config;
pub use settings::config as settings_config;

use crate::errors::PortfolioError;
use crate::models::ClientInfo;
use actix_web::http::header;
use actix_web::middleware::DefaultHeaders;
use actix_web::{guard, web, HttpRequest, HttpResponse};
use std::net::SocketAddr;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";
const MAX_JSON_BYTES: usize = 1024 * 1024;

/// Register every route of the API
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(preflight_config)
        .configure(health_config)
        .configure(auth_config)
        .configure(projects_config)
        .configure(blog_config)
        .configure(settings_config)
        .configure(contact_config)
        .configure(admin_config);
}

/// Client IP (proxy headers honoured, port stripped) and user agent
pub fn client_info(req: &HttpRequest) -> ClientInfo {
    let ip_address = req.connection_info().realip_remote_addr().map(|addr| {
        addr.parse::<SocketAddr>()
            .map(|socket| socket.ip().to_string())
            .unwrap_or_else(|_| addr.to_string())
    });
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.chars().take(500).collect());

    ClientInfo {
        ip_address,
        user_agent,
    }
}

/// CORS headers added to every response
/// DOCUMENTATION: A single configured origin, with credentials
pub fn cors_headers(allowed_origin: &str) -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, allowed_origin.to_string()))
        .add((header::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true"))
        .add((header::VARY, "Origin"))
}

/// OPTIONS /{any}
/// Answer CORS preflight requests
pub async fn preflight() -> HttpResponse {
    HttpResponse::NoContent()
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS))
        .insert_header((header::ACCESS_CONTROL_MAX_AGE, "86400"))
        .finish()
}

/// Must be registered before the other routes so it sees OPTIONS for every path
pub fn preflight_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{tail:.*}")
            .guard(guard::Options())
            .to(preflight),
    );
}

/// Malformed JSON bodies get the standard 400 envelope
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_JSON_BYTES)
        .error_handler(|err, _req| PortfolioError::InvalidInput(format!("Invalid request body: {}", err)).into())
}

/// Malformed query strings get the standard 400 envelope
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| PortfolioError::InvalidInput(format!("Invalid query string: {}", err)).into())
}

/// Path segments that fail to parse (e.g. a non-numeric id) are a 400 too
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| PortfolioError::InvalidInput(format!("Invalid path: {}", err)).into())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::{init_lazy_pool, Config};
    use crate::services::{LoginLimiter, SessionStore};
    use actix_web::web;
    use sqlx::MySqlPool;
    use std::sync::Arc;
    use std::time::Duration;

    /// Shared state for handler tests; the pool never connects unless a query runs
    pub struct TestState {
        pub config: Config,
        pub pool: MySqlPool,
        pub sessions: Arc<SessionStore>,
        pub limiter: Arc<LoginLimiter>,
    }

    impl TestState {
        pub fn new() -> Self {
            let config = Config::for_tests();
            let pool = init_lazy_pool(&config).expect("lazy pool");
            Self {
                config,
                pool,
                sessions: Arc::new(SessionStore::new(Duration::from_secs(3600))),
                limiter: Arc::new(LoginLimiter::new(5, Duration::from_secs(900))),
            }
        }

        pub fn register(&self, cfg: &mut web::ServiceConfig) {
            cfg.app_data(web::Data::new(self.pool.clone()))
                .app_data(web::Data::new(self.config.clone()))
                .app_data(web::Data::from(self.sessions.clone()))
                .app_data(web::Data::from(self.limiter.clone()))
                .app_data(super::json_config())
                .app_data(super::query_config())
                .app_data(super::path_config());
        }
    }
}
