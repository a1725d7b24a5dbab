// src/handlers/auth.rs
// DOCUMENTATION: Login, logout and session endpoints plus the admin extractor
// PURPOSE: Issue and revoke the session cookie, guard protected routes

use crate::config::Config;
use crate::errors::PortfolioError;
use crate::models::{AdminUserResponse, ApiResponse, LoginRequest, NewActivity};
use crate::services::{AdminService, AuthService, LoginLimiter, SessionStore, SESSION_COOKIE};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, Responder};
use sqlx::MySqlPool;
use std::future::Future;
use std::pin::Pin;

/// Authenticated admin for the current request
/// DOCUMENTATION: Extracting this from a request answers 401 when the
/// `portfolio_session` cookie is missing, unknown or expired
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub user: AdminUserResponse,
    pub session_id: String,
}

impl FromRequest for AdminSession {
    type Error = PortfolioError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let sessions = req.app_data::<web::Data<SessionStore>>().cloned();
        let session_id = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());

        Box::pin(async move {
            let sessions = sessions
                .ok_or_else(|| PortfolioError::InternalError("session store is not configured".to_string()))?;
            let session_id = session_id.ok_or(PortfolioError::Unauthorized)?;
            let user = sessions
                .get(&session_id)
                .await
                .ok_or(PortfolioError::Unauthorized)?;
            Ok(AdminSession { user, session_id })
        })
    }
}

impl AdminSession {
    /// Append an entry to the admin activity log
    pub async fn record(
        &self,
        pool: &MySqlPool,
        req: &HttpRequest,
        action: &str,
        entity_type: &str,
        entity_id: Option<i64>,
        details: Option<String>,
    ) {
        let client = super::client_info(req);
        AdminService::record_activity(
            pool,
            NewActivity {
                admin_id: self.user.id,
                action,
                entity_type,
                entity_id,
                details,
                ip_address: client.ip_address,
            },
        )
        .await;
    }
}

/// Browser-session cookie; expiry is left to the server-side idle timeout
fn session_cookie<'c>(value: String, config: &Config) -> Cookie<'c> {
    Cookie::build(SESSION_COOKIE, value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!config.is_development())
        .finish()
}

/// POST /api/login
/// Verify credentials and open a session
pub async fn login(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    sessions: web::Data<SessionStore>,
    limiter: web::Data<LoginLimiter>,
    req: HttpRequest,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, PortfolioError> {
    let client = super::client_info(&req);
    let (session_id, user) = AuthService::login(
        pool.get_ref(),
        sessions.get_ref(),
        limiter.get_ref(),
        body.into_inner(),
        &client,
    )
    .await?;

    AdminService::record_activity(
        pool.get_ref(),
        NewActivity {
            admin_id: user.id,
            action: "login",
            entity_type: "session",
            entity_id: None,
            details: None,
            ip_address: client.ip_address.clone(),
        },
    )
    .await;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(session_id, &config))
        .json(ApiResponse::with_message(user, "Login successful")))
}

/// POST /api/logout
/// Destroy the session if there is one and expire the cookie
pub async fn logout(
    config: web::Data<Config>,
    sessions: web::Data<SessionStore>,
    req: HttpRequest,
) -> impl Responder {
    let session_id = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());
    AuthService::logout(sessions.get_ref(), session_id.as_deref()).await;

    let mut cookie = session_cookie(String::new(), &config);
    cookie.make_removal();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::with_message((), "Logged out"))
}

/// GET /api/session
pub async fn session_status(sessions: web::Data<SessionStore>, req: HttpRequest) -> impl Responder {
    let session_id = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());
    let status = AuthService::status(sessions.get_ref(), session_id.as_deref()).await;
    HttpResponse::Ok().json(ApiResponse::ok(status))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/login", web::post().to(login))
        .route("/api/logout", web::post().to(logout))
        .route("/api/session", web::get().to(session_status));
}
