// src/db/blog_repository.rs
// DOCUMENTATION: Blog post database operations
// PURPOSE: Query, create, update and delete blog_posts rows

use super::{db_error, like_pattern};
use crate::errors::PortfolioError;
use crate::models::*;
use crate::services::listing::{PageRequest, ALL_CATEGORIES};
use sqlx::{MySql, MySqlPool, QueryBuilder};

const POST_COLUMNS: &str = "id, title, slug, excerpt, content, category, tags, featured_image, \
     status, read_time, views, published_at, created_at, updated_at";

/// Values written by create/update after the service derived them
pub struct BlogPostWrite<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub excerpt: Option<&'a str>,
    pub content: &'a str,
    pub category: &'a str,
    pub tags: Option<&'a str>,
    pub featured_image: Option<&'a str>,
    pub status: &'a str,
    pub read_time: i32,
}

pub struct BlogRepository;

impl BlogRepository {
    /// List posts with filters
    /// DOCUMENTATION: `published_only` restricts to published posts for the public site
    pub async fn list(
        pool: &MySqlPool,
        query: &BlogQuery,
        page: PageRequest,
        published_only: bool,
    ) -> Result<(Vec<BlogPost>, i64), PortfolioError> {
        let mut count_qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM blog_posts WHERE 1 = 1");
        push_filters(&mut count_qb, query, published_only);
        let (total,): (i64,) = count_qb
            .build_query_as()
            .fetch_one(pool)
            .await
            .map_err(|e| db_error("Count blog posts", e))?;

        let mut qb = QueryBuilder::<MySql>::new(format!("SELECT {} FROM blog_posts WHERE 1 = 1", POST_COLUMNS));
        push_filters(&mut qb, query, published_only);
        qb.push(" ORDER BY COALESCE(published_at, created_at) DESC, id DESC LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let posts = qb
            .build_query_as::<BlogPost>()
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("List blog posts", e))?;

        Ok((posts, total))
    }

    pub async fn get_by_id(pool: &MySqlPool, id: i64) -> Result<BlogPost, PortfolioError> {
        sqlx::query_as::<_, BlogPost>(&format!("SELECT {} FROM blog_posts WHERE id = ?", POST_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Fetch blog post", e))?
            .ok_or_else(|| PortfolioError::NotFound(format!("Blog post {}", id)))
    }

    pub async fn get_published_by_slug(pool: &MySqlPool, slug: &str) -> Result<BlogPost, PortfolioError> {
        sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {} FROM blog_posts WHERE slug = ? AND status = 'published'",
            POST_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await
        .map_err(|e| db_error("Fetch blog post by slug", e))?
        .ok_or_else(|| PortfolioError::NotFound(format!("Blog post '{}'", slug)))
    }

    pub async fn increment_views(pool: &MySqlPool, id: i64) -> Result<(), PortfolioError> {
        sqlx::query("UPDATE blog_posts SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| db_error("Increment blog views", e))?;
        Ok(())
    }

    /// Categories of published posts with their counts
    pub async fn categories(pool: &MySqlPool) -> Result<Vec<CategoryCount>, PortfolioError> {
        sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS count FROM blog_posts WHERE status = 'published' \
             GROUP BY category ORDER BY count DESC, category ASC",
        )
        .fetch_all(pool)
        .await
        .map_err(|e| db_error("Fetch blog categories", e))
    }

    pub async fn create(pool: &MySqlPool, post: &BlogPostWrite<'_>) -> Result<i64, PortfolioError> {
        let result = sqlx::query(
            r#"
            INSERT INTO blog_posts (
                title, slug, excerpt, content, category, tags, featured_image,
                status, read_time, views, published_at, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0,
                    CASE WHEN ? = 'published' THEN NOW() ELSE NULL END,
                    NOW(), NOW())
            "#,
        )
        .bind(post.title)
        .bind(post.slug)
        .bind(post.excerpt)
        .bind(post.content)
        .bind(post.category)
        .bind(post.tags)
        .bind(post.featured_image)
        .bind(post.status)
        .bind(post.read_time)
        .bind(post.status)
        .execute(pool)
        .await
        .map_err(|e| db_error("Create blog post", e))?;

        let id = result.last_insert_id() as i64;
        log::info!("Created blog post {} ({})", id, post.slug);
        Ok(id)
    }

    /// Overwrite a post with fully merged values
    /// published_at is stamped the first time the post becomes published
    pub async fn update(pool: &MySqlPool, id: i64, post: &BlogPostWrite<'_>) -> Result<(), PortfolioError> {
        sqlx::query(
            r#"
            UPDATE blog_posts
            SET title = ?, slug = ?, excerpt = ?, content = ?, category = ?,
                tags = ?, featured_image = ?, status = ?, read_time = ?,
                published_at = CASE
                    WHEN ? = 'published' AND published_at IS NULL THEN NOW()
                    ELSE published_at
                END,
                updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(post.title)
        .bind(post.slug)
        .bind(post.excerpt)
        .bind(post.content)
        .bind(post.category)
        .bind(post.tags)
        .bind(post.featured_image)
        .bind(post.status)
        .bind(post.read_time)
        .bind(post.status)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| db_error("Update blog post", e))?;

        log::info!("Updated blog post {}", id);
        Ok(())
    }

    pub async fn delete(pool: &MySqlPool, id: i64) -> Result<(), PortfolioError> {
        let rows = sqlx::query("DELETE FROM blog_posts WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| db_error("Delete blog post", e))?
            .rows_affected();

        if rows == 0 {
            return Err(PortfolioError::NotFound(format!("Blog post {}", id)));
        }

        log::info!("Deleted blog post {}", id);
        Ok(())
    }

    /// (published, draft) counts
    pub async fn count_by_status(pool: &MySqlPool) -> Result<(i64, i64), PortfolioError> {
        let counts: (i64, i64) = sqlx::query_as(
            "SELECT COUNT(CASE WHEN status = 'published' THEN 1 END), \
                    COUNT(CASE WHEN status = 'draft' THEN 1 END) FROM blog_posts",
        )
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Count blog posts", e))?;
        Ok(counts)
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, MySql>, query: &BlogQuery, published_only: bool) {
    if published_only {
        qb.push(" AND status = 'published'");
    } else if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND status = ").push_bind(status.to_string());
    }

    if let Some(category) = query
        .category
        .as_deref()
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES))
    {
        qb.push(" AND category = ").push_bind(category.to_string());
    }

    if let Some(tag) = query.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        qb.push(" AND FIND_IN_SET(").push_bind(tag.to_string()).push(", tags) > 0");
    }

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        qb.push(" AND (title LIKE ")
            .push_bind(pattern.clone())
            .push(" OR excerpt LIKE ")
            .push_bind(pattern.clone())
            .push(" OR content LIKE ")
            .push_bind(pattern.clone())
            .push(" OR tags LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_listing_ignores_status_filter() {
        let query = BlogQuery {
            status: Some("draft".into()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM blog_posts WHERE 1 = 1");
        push_filters(&mut qb, &query, true);
        assert!(qb.sql().contains("status = 'published'"));
        assert!(!qb.sql().contains("status = ?"));
    }

    #[test]
    fn test_admin_listing_uses_status_filter() {
        let query = BlogQuery {
            status: Some("draft".into()),
            tag: Some("rust".into()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM blog_posts WHERE 1 = 1");
        push_filters(&mut qb, &query, false);
        assert!(qb.sql().contains("status = ?"));
        assert!(qb.sql().contains("FIND_IN_SET(?, tags) > 0"));
    }
}
