// src/services/admin_service.rs
// DOCUMENTATION: Dashboard statistics, settings, activity log and visits

use crate::db::{AdminRepository, BlogRepository, ContactRepository, ProjectRepository, SettingsRepository};
use crate::errors::PortfolioError;
use crate::models::{
    is_valid_setting_key, settings_to_map, ActivityLogEntry, ClientInfo, DashboardStats,
    NewActivity, RecordVisitRequest, UpdateSettingsRequest,
};
use sqlx::MySqlPool;
use std::collections::BTreeMap;
use validator::Validate;

const MAX_ACTIVITY_ROWS: i64 = 200;

pub struct AdminService;

impl AdminService {
    pub async fn dashboard_stats(pool: &MySqlPool) -> Result<DashboardStats, PortfolioError> {
        let (total_projects, featured_projects) = ProjectRepository::count_all(pool).await?;
        let (published_posts, draft_posts) = BlogRepository::count_by_status(pool).await?;
        let (new_messages, total_messages) = ContactRepository::count_by_status(pool).await?;
        let visits_last_30_days = AdminRepository::count_recent_visits(pool, 30).await?;

        Ok(DashboardStats {
            total_projects,
            featured_projects,
            published_posts,
            draft_posts,
            new_messages,
            total_messages,
            visits_last_30_days,
        })
    }

    pub async fn recent_activity(
        pool: &MySqlPool,
        limit: Option<i64>,
    ) -> Result<Vec<ActivityLogEntry>, PortfolioError> {
        let limit = limit.unwrap_or(50).clamp(1, MAX_ACTIVITY_ROWS);
        AdminRepository::recent_activity(pool, limit).await
    }

    /// Append to the activity log without failing the calling request
    pub async fn record_activity(pool: &MySqlPool, activity: NewActivity<'_>) {
        if let Err(e) = AdminRepository::log_activity(pool, &activity).await {
            log::warn!(
                "Could not log activity {} on {}: {}",
                activity.action,
                activity.entity_type,
                e
            );
        }
    }

    pub async fn record_visit(
        pool: &MySqlPool,
        visit: RecordVisitRequest,
        client: &ClientInfo,
    ) -> Result<(), PortfolioError> {
        visit.validate()?;
        AdminRepository::record_visit(pool, &visit, client).await
    }

    pub async fn public_settings(pool: &MySqlPool) -> Result<BTreeMap<String, Option<String>>, PortfolioError> {
        let settings = SettingsRepository::list(pool, true).await?;
        Ok(settings_to_map(&settings))
    }

    pub async fn all_settings(pool: &MySqlPool) -> Result<BTreeMap<String, Option<String>>, PortfolioError> {
        let settings = SettingsRepository::list(pool, false).await?;
        Ok(settings_to_map(&settings))
    }

    pub async fn update_settings(
        pool: &MySqlPool,
        req: UpdateSettingsRequest,
    ) -> Result<usize, PortfolioError> {
        validate_settings(&req)?;
        SettingsRepository::upsert_many(pool, &req.settings, req.is_public.unwrap_or(true)).await
    }
}

fn validate_settings(req: &UpdateSettingsRequest) -> Result<(), PortfolioError> {
    if req.settings.is_empty() {
        return Err(PortfolioError::ValidationError(
            "settings: at least one setting is required".to_string(),
        ));
    }
    if let Some(bad) = req.settings.keys().find(|k| !is_valid_setting_key(k)) {
        return Err(PortfolioError::ValidationError(format!(
            "settings: invalid key '{}'",
            bad
        )));
    }
    Ok(())
}
