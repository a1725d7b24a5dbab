// src/db/admin_repository.rs
// DOCUMENTATION: Admin accounts, login attempts, activity log and site visits
// PURPOSE: Persistence behind authentication and the admin dashboard

use super::db_error;
use crate::errors::PortfolioError;
use crate::models::{ActivityLogEntry, AdminUser, ClientInfo, NewActivity, RecordVisitRequest};
use sqlx::MySqlPool;

pub struct AdminRepository;

impl AdminRepository {
    /// Look up an account by username or email
    pub async fn find_by_login(pool: &MySqlPool, login: &str) -> Result<Option<AdminUser>, PortfolioError> {
        sqlx::query_as::<_, AdminUser>(
            "SELECT id, username, email, password_hash, full_name, role, is_active, last_login, created_at \
             FROM admin_users WHERE username = ? OR email = ? LIMIT 1",
        )
        .bind(login)
        .bind(login)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error("Fetch admin user", e))
    }

    pub async fn touch_last_login(pool: &MySqlPool, id: i64) -> Result<(), PortfolioError> {
        sqlx::query("UPDATE admin_users SET last_login = NOW() WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| db_error("Update last login", e))?;
        Ok(())
    }

    pub async fn record_login_attempt(
        pool: &MySqlPool,
        username: &str,
        ip_address: Option<&str>,
        success: bool,
    ) -> Result<(), PortfolioError> {
        sqlx::query(
            "INSERT INTO login_attempts (username, ip_address, success, attempted_at) VALUES (?, ?, ?, NOW())",
        )
        .bind(username)
        .bind(ip_address)
        .bind(success)
        .execute(pool)
        .await
        .map_err(|e| db_error("Record login attempt", e))?;
        Ok(())
    }

    pub async fn log_activity(pool: &MySqlPool, activity: &NewActivity<'_>) -> Result<(), PortfolioError> {
        sqlx::query(
            "INSERT INTO admin_activity_log (admin_id, action, entity_type, entity_id, details, ip_address, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, NOW())",
        )
        .bind(activity.admin_id)
        .bind(activity.action)
        .bind(activity.entity_type)
        .bind(activity.entity_id)
        .bind(&activity.details)
        .bind(&activity.ip_address)
        .execute(pool)
        .await
        .map_err(|e| db_error("Log admin activity", e))?;
        Ok(())
    }

    pub async fn recent_activity(pool: &MySqlPool, limit: i64) -> Result<Vec<ActivityLogEntry>, PortfolioError> {
        sqlx::query_as::<_, ActivityLogEntry>(
            "SELECT id, admin_id, action, entity_type, entity_id, details, ip_address, created_at \
             FROM admin_activity_log ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(|e| db_error("Fetch admin activity", e))
    }

    pub async fn record_visit(
        pool: &MySqlPool,
        visit: &RecordVisitRequest,
        client: &ClientInfo,
    ) -> Result<(), PortfolioError> {
        sqlx::query(
            "INSERT INTO site_visits (page, referrer, ip_address, user_agent, visited_at) VALUES (?, ?, ?, ?, NOW())",
        )
        .bind(&visit.page)
        .bind(&visit.referrer)
        .bind(&client.ip_address)
        .bind(&client.user_agent)
        .execute(pool)
        .await
        .map_err(|e| db_error("Record site visit", e))?;
        Ok(())
    }

    pub async fn count_recent_visits(pool: &MySqlPool, days: i64) -> Result<i64, PortfolioError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM site_visits WHERE visited_at > NOW() - INTERVAL ? DAY",
        )
        .bind(days)
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Count site visits", e))?;
        Ok(count)
    }
}
