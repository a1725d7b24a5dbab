// src/models/blog.rs
// DOCUMENTATION: Blog post records
// PURPOSE: Serialization models for blog API and database

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

pub const BLOG_STATUSES: &[&str] = &["draft", "published", "archived"];

/// Reading speed used to estimate read_time
pub const WORDS_PER_MINUTE: usize = 200;

pub fn validate_blog_status(status: &str) -> Result<(), ValidationError> {
    super::one_of(status, BLOG_STATUSES, "blog_status")
}

/// Blog post row
/// DOCUMENTATION: Maps directly to the blog_posts table
/// Tags are stored as a comma separated list
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub category: String,
    pub tags: Option<String>,
    pub featured_image: Option<String>,
    pub status: String,
    /// Minutes, derived from the content length
    pub read_time: i32,
    pub views: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBlogPostRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub excerpt: Option<String>,

    #[validate(length(min = 1))]
    pub content: String,

    #[validate(length(min = 1, max = 100))]
    pub category: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub featured_image: Option<String>,

    #[serde(default)]
    #[validate(custom = "validate_blog_status")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateBlogPostRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,
    #[validate(length(max = 500))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    #[validate(custom = "validate_blog_status")]
    pub status: Option<String>,
}

/// Query string for GET /api/blog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Blog post as returned by the API, tags split into a list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPostResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub status: String,
    pub read_time: i32,
    pub views: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

impl BlogPost {
    pub fn to_response(&self) -> BlogPostResponse {
        BlogPostResponse {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            excerpt: self.excerpt.clone(),
            content: self.content.clone(),
            category: self.category.clone(),
            tags: split_tags(self.tags.as_deref()),
            featured_image: self.featured_image.clone(),
            status: self.status.clone(),
            read_time: self.read_time,
            views: self.views,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Estimated reading time in whole minutes, at least one
pub fn estimate_read_time(content: &str) -> i32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as i32
}

/// Store tags as a trimmed, comma separated list without empties
pub fn join_tags(tags: &[String]) -> Option<String> {
    let cleaned: Vec<&str> = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty() && !t.contains(','))
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.join(","))
    }
}

pub fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Fallback excerpt: first 160 characters of the content on a word boundary
pub fn derive_excerpt(content: &str) -> String {
    const MAX: usize = 160;
    let trimmed = content.trim();
    if trimmed.chars().count() <= MAX {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX).collect();
    let cut = match cut.rfind(char::is_whitespace) {
        Some(idx) => &cut[..idx],
        None => cut.as_str(),
    };
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_time() {
        assert_eq!(estimate_read_time(""), 1);
        assert_eq!(estimate_read_time(&"word ".repeat(200)), 1);
        assert_eq!(estimate_read_time(&"word ".repeat(201)), 2);
        assert_eq!(estimate_read_time(&"word ".repeat(1000)), 5);
    }

    #[test]
    fn test_tags_roundtrip_cleans_input() {
        let joined = join_tags(&[" rust ".into(), "".into(), "web".into()]);
        assert_eq!(joined.as_deref(), Some("rust,web"));
        assert_eq!(split_tags(joined.as_deref()), vec!["rust", "web"]);
        assert!(join_tags(&[]).is_none());
        assert!(split_tags(None).is_empty());
    }

    #[test]
    fn test_derive_excerpt() {
        assert_eq!(derive_excerpt("  short post  "), "short post");

        let long = "lorem ipsum ".repeat(30);
        let excerpt = derive_excerpt(&long);
        assert!(excerpt.ends_with("..."));
        assert!(excerpt.chars().count() <= 163);
    }

    #[test]
    fn test_status_validation() {
        let req: CreateBlogPostRequest = serde_json::from_value(serde_json::json!({
            "title": "Hello",
            "content": "Body",
            "category": "rust",
            "status": "scheduled"
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }
}
