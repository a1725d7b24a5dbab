// src/db/project_repository.rs
// DOCUMENTATION: Database access for projects and their child rows
// PURPOSE: All SQL touching projects, technologies, features, challenges and gallery

use super::{db_error, like_pattern};
use crate::errors::PortfolioError;
use crate::models::*;
use crate::services::listing::{PageRequest, ALL_CATEGORIES};
use sqlx::{MySql, MySqlPool, QueryBuilder, Transaction};
use std::collections::HashMap;

const PROJECT_COLUMNS: &str = "p.id, p.title, p.slug, p.short_description, p.description, \
     p.category, p.status, p.thumbnail_url, p.github_url, p.live_url, p.featured, \
     p.display_order, p.created_at, p.updated_at";

/// Tables whose rows belong to a single project, in delete order
const PROJECT_CHILD_TABLES: [&str; 4] = [
    "project_technologies",
    "project_features",
    "project_challenges",
    "project_gallery",
];

const LISTING_ORDER: &str = " ORDER BY p.display_order ASC, p.created_at DESC";

/// Child rows removed together with a project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeletedProjectRows {
    pub technology_links: u64,
    pub features: u64,
    pub challenges: u64,
    pub gallery_images: u64,
}

/// Child collections to write for a project
/// `None` leaves the existing rows alone, `Some` replaces them
#[derive(Debug, Default)]
pub struct ProjectChildren<'a> {
    pub technologies: Option<&'a [String]>,
    pub features: Option<&'a [String]>,
    pub challenges: Option<&'a [ChallengeInput]>,
    pub gallery: Option<&'a [GalleryInput]>,
}

pub struct ProjectRepository;

impl ProjectRepository {
    /// List projects matching the query
    /// DOCUMENTATION: Archived projects are excluded unless a status filter asks for them
    /// Ordered by display_order, then newest first. Returns (page, total_count)
    pub async fn list(
        pool: &MySqlPool,
        query: &ProjectQuery,
        page: PageRequest,
    ) -> Result<(Vec<Project>, i64), PortfolioError> {
        let mut count_qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM projects p WHERE ");
        push_filters(&mut count_qb, query);
        let (total,): (i64,) = count_qb
            .build_query_as()
            .fetch_one(pool)
            .await
            .map_err(|e| db_error("Count projects", e))?;

        let mut qb = listing_query(query);
        qb.push(" LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let projects = qb
            .build_query_as::<Project>()
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("List projects", e))?;

        log::debug!("Listed {} of {} projects", projects.len(), total);
        Ok((projects, total))
    }

    pub async fn get_by_id(pool: &MySqlPool, id: i64) -> Result<Project, PortfolioError> {
        sqlx::query_as::<_, Project>(&format!("SELECT {} FROM projects p WHERE p.id = ?", PROJECT_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Fetch project", e))?
            .ok_or_else(|| PortfolioError::NotFound(format!("Project {}", id)))
    }

    pub async fn get_by_slug(pool: &MySqlPool, slug: &str) -> Result<Project, PortfolioError> {
        sqlx::query_as::<_, Project>(&format!("SELECT {} FROM projects p WHERE p.slug = ?", PROJECT_COLUMNS))
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Fetch project by slug", e))?
            .ok_or_else(|| PortfolioError::NotFound(format!("Project '{}'", slug)))
    }

    /// Technology names per project id, alphabetical
    pub async fn technologies_for(
        pool: &MySqlPool,
        project_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<String>>, PortfolioError> {
        let mut map: HashMap<i64, Vec<String>> = HashMap::new();
        if project_ids.is_empty() {
            return Ok(map);
        }

        let mut qb = QueryBuilder::<MySql>::new(
            "SELECT pt.project_id, t.name FROM project_technologies pt \
             JOIN technologies t ON t.id = pt.technology_id WHERE pt.project_id IN (",
        );
        let mut ids = qb.separated(", ");
        for id in project_ids {
            ids.push_bind(*id);
        }
        qb.push(") ORDER BY t.name ASC");

        let rows: Vec<(i64, String)> = qb
            .build_query_as()
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("Fetch project technologies", e))?;

        for (project_id, name) in rows {
            map.entry(project_id).or_default().push(name);
        }
        Ok(map)
    }

    pub async fn features(pool: &MySqlPool, project_id: i64) -> Result<Vec<ProjectFeature>, PortfolioError> {
        sqlx::query_as::<_, ProjectFeature>(
            "SELECT id, project_id, feature, display_order FROM project_features \
             WHERE project_id = ? ORDER BY display_order ASC, id ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
        .map_err(|e| db_error("Fetch project features", e))
    }

    pub async fn challenges(pool: &MySqlPool, project_id: i64) -> Result<Vec<ProjectChallenge>, PortfolioError> {
        sqlx::query_as::<_, ProjectChallenge>(
            "SELECT id, project_id, challenge, solution, display_order FROM project_challenges \
             WHERE project_id = ? ORDER BY display_order ASC, id ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
        .map_err(|e| db_error("Fetch project challenges", e))
    }

    pub async fn gallery(pool: &MySqlPool, project_id: i64) -> Result<Vec<GalleryImage>, PortfolioError> {
        sqlx::query_as::<_, GalleryImage>(
            "SELECT id, project_id, image_url, caption, display_order FROM project_gallery \
             WHERE project_id = ? ORDER BY display_order ASC, id ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
        .map_err(|e| db_error("Fetch project gallery", e))
    }

    /// Insert a project and its child rows in one transaction
    pub async fn create(
        pool: &MySqlPool,
        req: &CreateProjectRequest,
        slug: &str,
    ) -> Result<i64, PortfolioError> {
        let mut tx = pool.begin().await.map_err(|e| db_error("Begin transaction", e))?;

        let result = sqlx::query(
            r#"
            INSERT INTO projects (
                title, slug, short_description, description, category, status,
                thumbnail_url, github_url, live_url, featured, display_order,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&req.title)
        .bind(slug)
        .bind(&req.short_description)
        .bind(&req.description)
        .bind(&req.category)
        .bind(req.status.as_deref().unwrap_or("completed"))
        .bind(&req.thumbnail_url)
        .bind(&req.github_url)
        .bind(&req.live_url)
        .bind(req.featured.unwrap_or(false))
        .bind(req.display_order.unwrap_or(0))
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Create project", e))?;

        let id = result.last_insert_id() as i64;

        let children = ProjectChildren {
            technologies: Some(&req.technologies),
            features: Some(&req.features),
            challenges: Some(&req.challenges),
            gallery: Some(&req.gallery),
        };
        write_children(&mut tx, id, &children).await?;

        tx.commit().await.map_err(|e| db_error("Commit project", e))?;

        log::info!("Created project {} ({})", id, slug);
        Ok(id)
    }

    /// Patch scalar fields and replace provided child collections
    pub async fn update(
        pool: &MySqlPool,
        id: i64,
        req: &UpdateProjectRequest,
        slug: Option<&str>,
    ) -> Result<(), PortfolioError> {
        let mut tx = pool.begin().await.map_err(|e| db_error("Begin transaction", e))?;

        let result = sqlx::query(
            r#"
            UPDATE projects
            SET title = COALESCE(?, title),
                slug = COALESCE(?, slug),
                short_description = COALESCE(?, short_description),
                description = COALESCE(?, description),
                category = COALESCE(?, category),
                status = COALESCE(?, status),
                thumbnail_url = COALESCE(?, thumbnail_url),
                github_url = COALESCE(?, github_url),
                live_url = COALESCE(?, live_url),
                featured = COALESCE(?, featured),
                display_order = COALESCE(?, display_order),
                updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(&req.title)
        .bind(slug)
        .bind(&req.short_description)
        .bind(&req.description)
        .bind(&req.category)
        .bind(&req.status)
        .bind(&req.thumbnail_url)
        .bind(&req.github_url)
        .bind(&req.live_url)
        .bind(req.featured)
        .bind(req.display_order)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Update project", e))?;

        // MySQL reports changed rows, so an unchanged existing row also yields 0
        if result.rows_affected() == 0 && !exists_in_tx(&mut tx, id).await? {
            return Err(PortfolioError::NotFound(format!("Project {}", id)));
        }

        let children = ProjectChildren {
            technologies: req.technologies.as_deref(),
            features: req.features.as_deref(),
            challenges: req.challenges.as_deref(),
            gallery: req.gallery.as_deref(),
        };
        write_children(&mut tx, id, &children).await?;

        tx.commit().await.map_err(|e| db_error("Commit project", e))?;

        log::info!("Updated project {}", id);
        Ok(())
    }

    /// Delete a project together with every dependent row
    /// DOCUMENTATION: Children are removed explicitly inside the transaction,
    /// so the cascade holds whether or not the schema declares ON DELETE CASCADE
    pub async fn delete(pool: &MySqlPool, id: i64) -> Result<DeletedProjectRows, PortfolioError> {
        let mut tx = pool.begin().await.map_err(|e| db_error("Begin transaction", e))?;

        if !exists_in_tx(&mut tx, id).await? {
            return Err(PortfolioError::NotFound(format!("Project {}", id)));
        }

        let mut counts = [0u64; PROJECT_CHILD_TABLES.len()];
        for (count, table) in counts.iter_mut().zip(PROJECT_CHILD_TABLES) {
            *count = delete_children(&mut tx, table, id).await?;
        }
        let [technology_links, features, challenges, gallery_images] = counts;
        let deleted = DeletedProjectRows {
            technology_links,
            features,
            challenges,
            gallery_images,
        };

        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Delete project", e))?;

        tx.commit().await.map_err(|e| db_error("Commit project delete", e))?;

        log::info!("Deleted project {} with {:?}", id, deleted);
        Ok(deleted)
    }

    pub async fn count_all(pool: &MySqlPool) -> Result<(i64, i64), PortfolioError> {
        let (total, featured): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(CASE WHEN featured = 1 THEN 1 END) FROM projects WHERE status <> 'archived'",
        )
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Count projects", e))?;
        Ok((total, featured))
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, MySql>, query: &ProjectQuery) {
    match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(status) => {
            qb.push("p.status = ").push_bind(status.to_string());
        }
        None => {
            qb.push("p.status <> 'archived'");
        }
    }

    if let Some(category) = query
        .category
        .as_deref()
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES))
    {
        qb.push(" AND p.category = ").push_bind(category.to_string());
    }

    if let Some(featured) = query.featured {
        qb.push(" AND p.featured = ").push_bind(featured);
    }

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        qb.push(" AND (p.title LIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.short_description LIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description LIKE ")
            .push_bind(pattern.clone())
            .push(
                " OR EXISTS (SELECT 1 FROM project_technologies pt \
                 JOIN technologies t ON t.id = pt.technology_id \
                 WHERE pt.project_id = p.id AND t.name LIKE ",
            )
            .push_bind(pattern)
            .push("))");
    }
}

async fn exists_in_tx(tx: &mut Transaction<'_, MySql>, id: i64) -> Result<bool, PortfolioError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM projects WHERE id = ? FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| db_error("Lock project", e))?;
    Ok(row.is_some())
}

/// SELECT over the filtered projects in listing order, without LIMIT/OFFSET
fn listing_query(query: &ProjectQuery) -> QueryBuilder<'static, MySql> {
    let mut qb = QueryBuilder::<MySql>::new(format!("SELECT {} FROM projects p WHERE ", PROJECT_COLUMNS));
    push_filters(&mut qb, query);
    qb.push(LISTING_ORDER);
    qb
}

fn delete_children_sql(table: &str) -> String {
    format!("DELETE FROM {} WHERE project_id = ?", table)
}

async fn delete_children(
    tx: &mut Transaction<'_, MySql>,
    table: &'static str,
    project_id: i64,
) -> Result<u64, PortfolioError> {
    let result = sqlx::query(&delete_children_sql(table))
        .bind(project_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| db_error("Delete project children", e))?;
    Ok(result.rows_affected())
}

async fn write_children(
    tx: &mut Transaction<'_, MySql>,
    project_id: i64,
    children: &ProjectChildren<'_>,
) -> Result<(), PortfolioError> {
    if let Some(technologies) = children.technologies {
        delete_children(tx, "project_technologies", project_id).await?;
        for name in normalize_technologies(technologies) {
            // LAST_INSERT_ID(id) makes an existing row report its id
            let tech = sqlx::query(
                "INSERT INTO technologies (name) VALUES (?) ON DUPLICATE KEY UPDATE id = LAST_INSERT_ID(id)",
            )
            .bind(&name)
            .execute(&mut **tx)
            .await
            .map_err(|e| db_error("Upsert technology", e))?;

            sqlx::query("INSERT IGNORE INTO project_technologies (project_id, technology_id) VALUES (?, ?)")
                .bind(project_id)
                .bind(tech.last_insert_id() as i64)
                .execute(&mut **tx)
                .await
                .map_err(|e| db_error("Link technology", e))?;
        }
    }

    if let Some(features) = children.features {
        delete_children(tx, "project_features", project_id).await?;
        let features = features.iter().map(|f| f.trim()).filter(|f| !f.is_empty());
        for (order, feature) in features.enumerate() {
            sqlx::query("INSERT INTO project_features (project_id, feature, display_order) VALUES (?, ?, ?)")
                .bind(project_id)
                .bind(feature)
                .bind(order as i32)
                .execute(&mut **tx)
                .await
                .map_err(|e| db_error("Insert project feature", e))?;
        }
    }

    if let Some(challenges) = children.challenges {
        delete_children(tx, "project_challenges", project_id).await?;
        for (order, item) in challenges.iter().enumerate() {
            sqlx::query(
                "INSERT INTO project_challenges (project_id, challenge, solution, display_order) VALUES (?, ?, ?, ?)",
            )
            .bind(project_id)
            .bind(&item.challenge)
            .bind(&item.solution)
            .bind(order as i32)
            .execute(&mut **tx)
            .await
            .map_err(|e| db_error("Insert project challenge", e))?;
        }
    }

    if let Some(gallery) = children.gallery {
        delete_children(tx, "project_gallery", project_id).await?;
        for (order, image) in gallery.iter().enumerate() {
            sqlx::query(
                "INSERT INTO project_gallery (project_id, image_url, caption, display_order) VALUES (?, ?, ?, ?)",
            )
            .bind(project_id)
            .bind(&image.image_url)
            .bind(&image.caption)
            .bind(order as i32)
            .execute(&mut **tx)
            .await
            .map_err(|e| db_error("Insert gallery image", e))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_listing_excludes_archived_and_orders_by_display_order() {
        let query = ProjectQuery::default();
        let qb = listing_query(&query);
        let sql = qb.sql();
        assert!(sql.ends_with("WHERE p.status <> 'archived' ORDER BY p.display_order ASC, p.created_at DESC"));
    }

    #[test]
    fn test_delete_cascades_to_every_child_table() {
        let mut tables = PROJECT_CHILD_TABLES.to_vec();
        tables.sort_unstable();
        assert_eq!(
            tables,
            vec!["project_challenges", "project_features", "project_gallery", "project_technologies"]
        );
        for table in PROJECT_CHILD_TABLES {
            assert_eq!(
                delete_children_sql(table),
                format!("DELETE FROM {} WHERE project_id = ?", table)
            );
        }
    }

    #[test]
    fn test_filters_are_bound_not_interpolated() {
        let query = ProjectQuery {
            category: Some("web'; DROP TABLE projects; --".into()),
            search: Some("rust".into()),
            featured: Some(true),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM projects p WHERE ");
        push_filters(&mut qb, &query);
        let sql = qb.sql();
        assert!(!sql.contains("DROP TABLE"));
        assert!(sql.contains("p.category = ?"));
        assert!(sql.contains("p.featured = ?"));
        assert!(sql.contains("t.name LIKE ?"));
    }

    #[test]
    fn test_all_category_is_not_a_filter() {
        let query = ProjectQuery {
            category: Some("all".into()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM projects p WHERE ");
        push_filters(&mut qb, &query);
        assert!(!qb.sql().contains("category"));
    }

    #[test]
    fn test_status_filter_replaces_archive_exclusion() {
        let query = ProjectQuery {
            status: Some("archived".into()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM projects p WHERE ");
        push_filters(&mut qb, &query);
        assert!(qb.sql().contains("p.status = ?"));
        assert!(!qb.sql().contains("<> 'archived'"));
    }
}
