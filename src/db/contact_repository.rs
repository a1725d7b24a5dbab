// src/db/contact_repository.rs
// DOCUMENTATION: Contact submission database operations

use super::db_error;
use crate::errors::PortfolioError;
use crate::models::{ClientInfo, ContactQuery, ContactSubmission, CreateContactRequest};
use crate::services::listing::PageRequest;
use sqlx::{MySql, MySqlPool, QueryBuilder};

const CONTACT_COLUMNS: &str = "id, name, email, subject, message, project_type, budget, timeline, \
     status, ip_address, user_agent, created_at";

pub struct ContactRepository;

impl ContactRepository {
    pub async fn create(
        pool: &MySqlPool,
        req: &CreateContactRequest,
        client: &ClientInfo,
    ) -> Result<i64, PortfolioError> {
        let result = sqlx::query(
            r#"
            INSERT INTO contact_submissions (
                name, email, subject, message, project_type, budget, timeline,
                status, ip_address, user_agent, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, 'new', ?, ?, NOW())
            "#,
        )
        .bind(req.name.trim())
        .bind(req.email.trim())
        .bind(&req.subject)
        .bind(req.message.trim())
        .bind(&req.project_type)
        .bind(&req.budget)
        .bind(&req.timeline)
        .bind(&client.ip_address)
        .bind(&client.user_agent)
        .execute(pool)
        .await
        .map_err(|e| db_error("Create contact submission", e))?;

        Ok(result.last_insert_id() as i64)
    }

    pub async fn list(
        pool: &MySqlPool,
        query: &ContactQuery,
        page: PageRequest,
    ) -> Result<(Vec<ContactSubmission>, i64), PortfolioError> {
        let status = query.status.as_deref().filter(|s| !s.is_empty());

        let mut count_qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM contact_submissions");
        if let Some(status) = status {
            count_qb.push(" WHERE status = ").push_bind(status.to_string());
        }
        let (total,): (i64,) = count_qb
            .build_query_as()
            .fetch_one(pool)
            .await
            .map_err(|e| db_error("Count contact submissions", e))?;

        let mut qb = QueryBuilder::<MySql>::new(format!("SELECT {} FROM contact_submissions", CONTACT_COLUMNS));
        if let Some(status) = status {
            qb.push(" WHERE status = ").push_bind(status.to_string());
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let submissions = qb
            .build_query_as::<ContactSubmission>()
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("List contact submissions", e))?;

        Ok((submissions, total))
    }

    pub async fn get_by_id(pool: &MySqlPool, id: i64) -> Result<ContactSubmission, PortfolioError> {
        sqlx::query_as::<_, ContactSubmission>(&format!(
            "SELECT {} FROM contact_submissions WHERE id = ?",
            CONTACT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error("Fetch contact submission", e))?
        .ok_or_else(|| PortfolioError::NotFound(format!("Contact submission {}", id)))
    }

    pub async fn update_status(pool: &MySqlPool, id: i64, status: &str) -> Result<(), PortfolioError> {
        sqlx::query("UPDATE contact_submissions SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| db_error("Update contact status", e))?;
        Ok(())
    }

    pub async fn delete(pool: &MySqlPool, id: i64) -> Result<(), PortfolioError> {
        let rows = sqlx::query("DELETE FROM contact_submissions WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| db_error("Delete contact submission", e))?
            .rows_affected();

        if rows == 0 {
            return Err(PortfolioError::NotFound(format!("Contact submission {}", id)));
        }
        Ok(())
    }

    /// (new, total) counts
    pub async fn count_by_status(pool: &MySqlPool) -> Result<(i64, i64), PortfolioError> {
        let counts: (i64, i64) = sqlx::query_as(
            "SELECT COUNT(CASE WHEN status = 'new' THEN 1 END), COUNT(*) FROM contact_submissions",
        )
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Count contact submissions", e))?;
        Ok(counts)
    }
}
