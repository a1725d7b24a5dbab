// src/handlers/settings.rs
// DOCUMENTATION: Site settings endpoints

use crate::errors::PortfolioError;
use crate::handlers::AdminSession;
use crate::models::{ApiResponse, UpdateSettingsRequest};
use crate::services::AdminService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::MySqlPool;

/// GET /api/settings
/// Public settings as a key/value map
pub async fn public_settings(pool: web::Data<MySqlPool>) -> Result<impl Responder, PortfolioError> {
    let settings = AdminService::public_settings(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(settings)))
}

/// GET /api/settings/all
pub async fn all_settings(
    _admin: AdminSession,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, PortfolioError> {
    let settings = AdminService::all_settings(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(settings)))
}

/// PUT /api/settings
/// Upsert the given keys and answer with every setting
pub async fn update_settings(
    admin: AdminSession,
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    body: web::Json<UpdateSettingsRequest>,
) -> Result<impl Responder, PortfolioError> {
    let body = body.into_inner();
    let keys = body.settings.keys().cloned().collect::<Vec<_>>().join(", ");

    let updated = AdminService::update_settings(pool.get_ref(), body).await?;
    admin
        .record(pool.get_ref(), &req, "update", "settings", None, Some(keys))
        .await;

    let settings = AdminService::all_settings(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        settings,
        format!("{} settings updated", updated),
    )))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/settings")
            .route("", web::get().to(public_settings))
            .route("", web::put().to(update_settings))
            .route("/all", web::get().to(all_settings)),
    );
}
