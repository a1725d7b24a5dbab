// src/models/admin.rs
// DOCUMENTATION: Admin users, sessions and audit records
// PURPOSE: Models for login, activity log, visits and dashboard statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Admin account row
/// DOCUMENTATION: password_hash holds an Argon2 PHC string and never leaves the server
#[derive(Debug, Clone, FromRow)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// User fields returned by login and session endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
}

impl AdminUser {
    pub fn to_response(&self) -> AdminUserResponse {
        AdminUserResponse {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            role: self.role.clone(),
        }
    }
}

/// Body of POST /api/login
/// `username` may also be the account email
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 255, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response of GET /api/session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user: Option<AdminUserResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityLogEntry {
    pub id: i64,
    pub admin_id: Option<i64>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Activity to append to admin_activity_log
#[derive(Debug, Clone)]
pub struct NewActivity<'a> {
    pub admin_id: i64,
    pub action: &'a str,
    pub entity_type: &'a str,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
    pub ip_address: Option<String>,
}

/// Body of POST /api/visits
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordVisitRequest {
    #[validate(length(min = 1, max = 255))]
    pub page: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

/// Counts shown on the admin dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_projects: i64,
    pub featured_projects: i64,
    pub published_posts: i64,
    pub draft_posts: i64,
    pub new_messages: i64,
    pub total_messages: i64,
    pub visits_last_30_days: i64,
}
