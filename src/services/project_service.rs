// src/services/project_service.rs
// DOCUMENTATION: Business logic for projects
// PURPOSE: Intermediary between handlers and repository, assembles child collections

use crate::db::{DeletedProjectRows, ProjectRepository};
use crate::errors::PortfolioError;
use crate::models::{
    slugify, CreateProjectRequest, Paginated, Project, ProjectDetailResponse, ProjectQuery,
    ProjectResponse, UpdateProjectRequest,
};
use crate::services::listing::{PageRequest, Pagination};
use sqlx::MySqlPool;
use validator::Validate;

pub struct ProjectService;

impl ProjectService {
    /// List projects with their technologies
    pub async fn list(
        pool: &MySqlPool,
        query: ProjectQuery,
    ) -> Result<Paginated<ProjectResponse>, PortfolioError> {
        let page = PageRequest::new(query.page, query.limit);
        let (projects, total) = ProjectRepository::list(pool, &query, page).await?;

        let ids: Vec<i64> = projects.iter().map(|p| p.id).collect();
        let mut technologies = ProjectRepository::technologies_for(pool, &ids).await?;

        let items = projects
            .into_iter()
            .map(|project| ProjectResponse {
                technologies: technologies.remove(&project.id).unwrap_or_default(),
                project,
            })
            .collect();

        Ok(Paginated {
            items,
            pagination: Pagination::new(page, total),
        })
    }

    /// Get a project by numeric id or by slug
    pub async fn get(pool: &MySqlPool, identifier: &str) -> Result<ProjectDetailResponse, PortfolioError> {
        let project = match identifier.parse::<i64>() {
            Ok(id) => ProjectRepository::get_by_id(pool, id).await?,
            Err(_) => ProjectRepository::get_by_slug(pool, identifier).await?,
        };
        Self::detail(pool, project).await
    }

    pub async fn create(
        pool: &MySqlPool,
        req: CreateProjectRequest,
    ) -> Result<ProjectDetailResponse, PortfolioError> {
        req.validate()?;
        let slug = resolve_slug(req.slug.as_deref(), &req.title)?;

        let id = ProjectRepository::create(pool, &req, &slug).await?;
        let project = ProjectRepository::get_by_id(pool, id).await?;
        Self::detail(pool, project).await
    }

    pub async fn update(
        pool: &MySqlPool,
        id: i64,
        req: UpdateProjectRequest,
    ) -> Result<ProjectDetailResponse, PortfolioError> {
        req.validate()?;
        let slug = match req.slug.as_deref() {
            Some(raw) => Some(resolve_slug(Some(raw), "")?),
            None => None,
        };

        ProjectRepository::update(pool, id, &req, slug.as_deref()).await?;
        let project = ProjectRepository::get_by_id(pool, id).await?;
        Self::detail(pool, project).await
    }

    /// Delete a project and everything hanging off it
    pub async fn delete(pool: &MySqlPool, id: i64) -> Result<DeletedProjectRows, PortfolioError> {
        ProjectRepository::delete(pool, id).await
    }

    async fn detail(pool: &MySqlPool, project: Project) -> Result<ProjectDetailResponse, PortfolioError> {
        let technologies = ProjectRepository::technologies_for(pool, &[project.id])
            .await?
            .remove(&project.id)
            .unwrap_or_default();
        let features = ProjectRepository::features(pool, project.id).await?;
        let challenges = ProjectRepository::challenges(pool, project.id).await?;
        let gallery = ProjectRepository::gallery(pool, project.id).await?;

        Ok(ProjectDetailResponse {
            project,
            technologies,
            features,
            challenges,
            gallery,
        })
    }
}

/// Slug from the explicit value, falling back to the title
pub(crate) fn resolve_slug(explicit: Option<&str>, title: &str) -> Result<String, PortfolioError> {
    let source = explicit.filter(|s| !s.trim().is_empty()).unwrap_or(title);
    let slug = slugify(source);
    if slug.is_empty() {
        return Err(PortfolioError::ValidationError(
            "slug: must contain at least one letter or digit".to_string(),
        ));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_slug_prefers_explicit() {
        assert_eq!(resolve_slug(Some("My Custom Slug"), "Title").unwrap(), "my-custom-slug");
        assert_eq!(resolve_slug(None, "Realtime Chat App").unwrap(), "realtime-chat-app");
        assert_eq!(resolve_slug(Some("   "), "Fallback Title").unwrap(), "fallback-title");
    }

    #[test]
    fn test_resolve_slug_rejects_empty() {
        assert!(matches!(
            resolve_slug(None, "???"),
            Err(PortfolioError::ValidationError(_))
        ));
    }
}
