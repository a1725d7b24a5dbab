// src/handlers/admin.rs
// DOCUMENTATION: Admin dashboard endpoints and visit tracking
// PURPOSE: Expose statistics and the activity log to the dashboard

use crate::errors::PortfolioError;
use crate::handlers::AdminSession;
use crate::models::{ActivityQuery, ApiResponse, RecordVisitRequest};
use crate::services::AdminService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::MySqlPool;

/// GET /api/admin/stats
/// Counts for the dashboard cards
pub async fn dashboard_stats(
    _admin: AdminSession,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, PortfolioError> {
    let stats = AdminService::dashboard_stats(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(stats)))
}

/// GET /api/admin/activity?limit=
/// Most recent activity log entries
pub async fn recent_activity(
    _admin: AdminSession,
    pool: web::Data<MySqlPool>,
    query: web::Query<ActivityQuery>,
) -> Result<impl Responder, PortfolioError> {
    let entries = AdminService::recent_activity(pool.get_ref(), query.limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(entries)))
}

/// POST /api/visits
/// Record a page view from the public site
pub async fn record_visit(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    body: web::Json<RecordVisitRequest>,
) -> Result<impl Responder, PortfolioError> {
    let client = super::client_info(&req);
    AdminService::record_visit(pool.get_ref(), body.into_inner(), &client).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(())))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/visits", web::post().to(record_visit)).service(
        web::scope("/api/admin")
            .route("/stats", web::get().to(dashboard_stats))
            .route("/activity", web::get().to(recent_activity)),
    );
}
