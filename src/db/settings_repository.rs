// src/db/settings_repository.rs
// DOCUMENTATION: Key/value site settings

use super::db_error;
use crate::errors::PortfolioError;
use crate::models::Setting;
use sqlx::MySqlPool;
use std::collections::BTreeMap;

pub struct SettingsRepository;

impl SettingsRepository {
    /// All settings, or only the public ones
    pub async fn list(pool: &MySqlPool, public_only: bool) -> Result<Vec<Setting>, PortfolioError> {
        let sql = if public_only {
            "SELECT setting_key, setting_value, is_public, updated_at FROM settings \
             WHERE is_public = 1 ORDER BY setting_key"
        } else {
            "SELECT setting_key, setting_value, is_public, updated_at FROM settings ORDER BY setting_key"
        };

        sqlx::query_as::<_, Setting>(sql)
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("Fetch settings", e))
    }

    /// Upsert every key in one transaction
    /// Existing keys keep their visibility; new keys take `is_public`
    pub async fn upsert_many(
        pool: &MySqlPool,
        values: &BTreeMap<String, String>,
        is_public: bool,
    ) -> Result<usize, PortfolioError> {
        let mut tx = pool.begin().await.map_err(|e| db_error("Begin transaction", e))?;

        for (key, value) in values {
            sqlx::query(
                "INSERT INTO settings (setting_key, setting_value, is_public, updated_at) \
                 VALUES (?, ?, ?, NOW()) \
                 ON DUPLICATE KEY UPDATE setting_value = VALUES(setting_value), updated_at = NOW()",
            )
            .bind(key)
            .bind(value)
            .bind(is_public)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Upsert setting", e))?;
        }

        tx.commit().await.map_err(|e| db_error("Commit settings", e))?;

        log::info!("Updated {} settings", values.len());
        Ok(values.len())
    }
}
