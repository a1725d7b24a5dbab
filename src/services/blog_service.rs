// src/services/blog_service.rs
// DOCUMENTATION: Business logic for blog posts
// PURPOSE: Derive slugs, excerpts and read times; merge partial updates

use crate::db::{BlogPostWrite, BlogRepository};
use crate::errors::PortfolioError;
use crate::models::{
    derive_excerpt, estimate_read_time, join_tags, BlogPostResponse, BlogQuery, CategoryCount,
    CreateBlogPostRequest, Paginated, UpdateBlogPostRequest,
};
use crate::services::listing::{PageRequest, Pagination};
use crate::services::project_service::resolve_slug;
use sqlx::MySqlPool;
use validator::Validate;

pub struct BlogService;

impl BlogService {
    /// Published posts for the public site
    pub async fn list_published(
        pool: &MySqlPool,
        query: BlogQuery,
    ) -> Result<Paginated<BlogPostResponse>, PortfolioError> {
        Self::list(pool, query, true).await
    }

    /// Every post regardless of status, for the admin dashboard
    pub async fn list_all(
        pool: &MySqlPool,
        query: BlogQuery,
    ) -> Result<Paginated<BlogPostResponse>, PortfolioError> {
        Self::list(pool, query, false).await
    }

    async fn list(
        pool: &MySqlPool,
        query: BlogQuery,
        published_only: bool,
    ) -> Result<Paginated<BlogPostResponse>, PortfolioError> {
        let page = PageRequest::new(query.page, query.limit);
        let (posts, total) = BlogRepository::list(pool, &query, page, published_only).await?;
        Ok(Paginated {
            items: posts.iter().map(|p| p.to_response()).collect(),
            pagination: Pagination::new(page, total),
        })
    }

    /// Fetch a published post and count the view
    pub async fn read(pool: &MySqlPool, slug: &str) -> Result<BlogPostResponse, PortfolioError> {
        let mut post = BlogRepository::get_published_by_slug(pool, slug).await?;
        BlogRepository::increment_views(pool, post.id).await?;
        post.views += 1;
        Ok(post.to_response())
    }

    pub async fn categories(pool: &MySqlPool) -> Result<Vec<CategoryCount>, PortfolioError> {
        BlogRepository::categories(pool).await
    }

    pub async fn create(
        pool: &MySqlPool,
        req: CreateBlogPostRequest,
    ) -> Result<BlogPostResponse, PortfolioError> {
        req.validate()?;

        let slug = resolve_slug(req.slug.as_deref(), &req.title)?;
        let excerpt = req
            .excerpt
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| derive_excerpt(&req.content));
        let tags = join_tags(&req.tags);

        let write = BlogPostWrite {
            title: req.title.trim(),
            slug: &slug,
            excerpt: Some(&excerpt),
            content: &req.content,
            category: req.category.trim(),
            tags: tags.as_deref(),
            featured_image: req.featured_image.as_deref(),
            status: req.status.as_deref().unwrap_or("draft"),
            read_time: estimate_read_time(&req.content),
        };

        let id = BlogRepository::create(pool, &write).await?;
        Ok(BlogRepository::get_by_id(pool, id).await?.to_response())
    }

    /// Merge provided fields over the stored post and write it back
    pub async fn update(
        pool: &MySqlPool,
        id: i64,
        req: UpdateBlogPostRequest,
    ) -> Result<BlogPostResponse, PortfolioError> {
        req.validate()?;
        let current = BlogRepository::get_by_id(pool, id).await?;

        let slug = match req.slug.as_deref() {
            Some(raw) => resolve_slug(Some(raw), "")?,
            None => current.slug.clone(),
        };
        let content = req.content.clone().unwrap_or_else(|| current.content.clone());
        let excerpt = req.excerpt.clone().or_else(|| current.excerpt.clone());
        let tags = match &req.tags {
            Some(tags) => join_tags(tags),
            None => current.tags.clone(),
        };
        let title = req.title.clone().unwrap_or_else(|| current.title.clone());
        let category = req.category.clone().unwrap_or_else(|| current.category.clone());
        let featured_image = req.featured_image.clone().or_else(|| current.featured_image.clone());
        let status = req.status.clone().unwrap_or_else(|| current.status.clone());

        let write = BlogPostWrite {
            title: &title,
            slug: &slug,
            excerpt: excerpt.as_deref(),
            content: &content,
            category: &category,
            tags: tags.as_deref(),
            featured_image: featured_image.as_deref(),
            status: &status,
            read_time: estimate_read_time(&content),
        };

        BlogRepository::update(pool, id, &write).await?;
        Ok(BlogRepository::get_by_id(pool, id).await?.to_response())
    }

    pub async fn delete(pool: &MySqlPool, id: i64) -> Result<(), PortfolioError> {
        BlogRepository::delete(pool, id).await
    }
}
