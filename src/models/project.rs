// src/models/project.rs
// DOCUMENTATION: Project records and their child rows
// PURPOSE: Serialization models for project API and database

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

pub const PROJECT_STATUSES: &[&str] = &["planning", "in_progress", "completed", "archived"];

pub fn validate_project_status(status: &str) -> Result<(), ValidationError> {
    super::one_of(status, PROJECT_STATUSES, "project_status")
}

/// Represents a project row from the database
/// DOCUMENTATION: Maps directly to the projects table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub category: String,
    /// planning, in_progress, completed or archived
    pub status: String,
    pub thumbnail_url: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: bool,
    /// Ascending sort key for listings
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectFeature {
    pub id: i64,
    pub project_id: i64,
    pub feature: String,
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectChallenge {
    pub id: i64,
    pub project_id: i64,
    pub challenge: String,
    pub solution: Option<String>,
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GalleryImage {
    pub id: i64,
    pub project_id: i64,
    pub image_url: String,
    pub caption: Option<String>,
    pub display_order: i32,
}

/// Challenge/solution pair submitted with a project
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChallengeInput {
    #[validate(length(min = 1, max = 1000))]
    pub challenge: String,
    #[serde(default)]
    pub solution: Option<String>,
}

/// Gallery image submitted with a project
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GalleryInput {
    #[validate(length(min = 1, max = 500))]
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Request DTO for creating a new project
/// DOCUMENTATION: Body of POST /api/projects
/// Child collections are inserted in the same transaction as the project
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    /// Derived from the title when omitted
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub short_description: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub category: String,

    #[serde(default)]
    #[validate(custom = "validate_project_status")]
    pub status: Option<String>,

    #[serde(default)]
    pub thumbnail_url: Option<String>,

    #[serde(default)]
    #[validate(url)]
    pub github_url: Option<String>,

    #[serde(default)]
    #[validate(url)]
    pub live_url: Option<String>,

    #[serde(default)]
    pub featured: Option<bool>,

    #[serde(default)]
    pub display_order: Option<i32>,

    #[serde(default)]
    pub technologies: Vec<String>,

    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    #[validate]
    pub challenges: Vec<ChallengeInput>,

    #[serde(default)]
    #[validate]
    pub gallery: Vec<GalleryInput>,
}

/// Request DTO for updating a project
/// DOCUMENTATION: Body of PUT /api/projects/{id}
/// Scalar fields are patched when present; child collections are replaced when present
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,
    #[validate(length(max = 500))]
    pub short_description: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(custom = "validate_project_status")]
    pub status: Option<String>,
    pub thumbnail_url: Option<String>,
    #[validate(url)]
    pub github_url: Option<String>,
    #[validate(url)]
    pub live_url: Option<String>,
    pub featured: Option<bool>,
    pub display_order: Option<i32>,
    pub technologies: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    #[validate]
    pub challenges: Option<Vec<ChallengeInput>>,
    #[validate]
    pub gallery: Option<Vec<GalleryInput>>,
}

/// Query string for GET /api/projects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Listing entry: project plus its technology names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResponse {
    #[serde(flatten)]
    pub project: Project,
    pub technologies: Vec<String>,
}

/// Full project with every child collection
/// DOCUMENTATION: Used for GET /api/projects/{id_or_slug}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: Project,
    pub technologies: Vec<String>,
    pub features: Vec<ProjectFeature>,
    pub challenges: Vec<ProjectChallenge>,
    pub gallery: Vec<GalleryImage>,
}

/// Normalize technology names: trimmed, non-empty, de-duplicated case-insensitively, order kept
pub fn normalize_technologies(names: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(n.to_lowercase()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> CreateProjectRequest {
        serde_json::from_value(serde_json::json!({
            "title": "Portfolio Site",
            "category": "web",
            "technologies": ["Rust", "MySQL"]
        }))
        .unwrap()
    }

    #[test]
    fn test_create_request_defaults() {
        let req = sample_request();
        assert!(req.validate().is_ok());
        assert!(req.slug.is_none());
        assert!(req.features.is_empty());
        assert_eq!(req.technologies.len(), 2);
    }

    #[test]
    fn test_create_request_rejects_unknown_status() {
        let mut req = sample_request();
        req.status = Some("deleted".to_string());
        assert!(req.validate().is_err());

        req.status = Some("in_progress".to_string());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_bad_url() {
        let mut req = sample_request();
        req.github_url = Some("not a url".to_string());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_nested_challenge_validation() {
        let mut req = sample_request();
        req.challenges = vec![ChallengeInput {
            challenge: String::new(),
            solution: None,
        }];
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_validates_nested_children_like_create() {
        let empty_challenge = UpdateProjectRequest {
            challenges: Some(vec![ChallengeInput {
                challenge: String::new(),
                solution: None,
            }]),
            ..Default::default()
        };
        assert!(empty_challenge.validate().is_err());

        let empty_image = UpdateProjectRequest {
            gallery: Some(vec![GalleryInput {
                image_url: String::new(),
                caption: Some("Screenshot".to_string()),
            }]),
            ..Default::default()
        };
        assert!(empty_image.validate().is_err());

        let untouched = UpdateProjectRequest::default();
        assert!(untouched.validate().is_ok());
    }

    #[test]
    fn test_normalize_technologies() {
        let names = vec![
            " Rust ".to_string(),
            "rust".to_string(),
            "".to_string(),
            "Actix".to_string(),
        ];
        assert_eq!(normalize_technologies(&names), vec!["Rust", "Actix"]);
    }

    #[test]
    fn test_response_flattens_project() {
        let now = Utc::now();
        let response = ProjectResponse {
            project: Project {
                id: 7,
                title: "CLI".into(),
                slug: "cli".into(),
                short_description: None,
                description: None,
                category: "tools".into(),
                status: "completed".into(),
                thumbnail_url: None,
                github_url: None,
                live_url: None,
                featured: false,
                display_order: 1,
                created_at: now,
                updated_at: now,
            },
            technologies: vec!["Rust".into()],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["slug"], "cli");
        assert_eq!(value["technologies"][0], "Rust");
    }
}
