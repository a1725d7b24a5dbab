// src/services/listing.rs
// DOCUMENTATION: Search, category filtering and pagination rules
// PURPOSE: Shared by the list endpoints and by client-side listings

use crate::models::{BlogPostResponse, ProjectResponse};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: i64 = 12;
pub const MAX_PER_PAGE: i64 = 100;

/// Category value that disables category filtering
pub const ALL_CATEGORIES: &str = "all";

/// Requested page window, already clamped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Page is clamped to >= 1, per_page to 1..=100
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: limit.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Saturates instead of overflowing for absurd page numbers
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Pagination metadata returned next to a page of items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let total = total.max(0);
        let total_pages = (total + request.per_page - 1) / request.per_page;
        Self {
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages,
            has_more: request.page < total_pages,
        }
    }
}

/// Anything that can be listed with search and category filters
pub trait Listable {
    fn category(&self) -> &str;

    /// Text fields matched by the free-text search
    fn search_fields(&self) -> Vec<&str>;
}

impl Listable for ProjectResponse {
    fn category(&self) -> &str {
        &self.project.category
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.project.title.as_str()];
        fields.extend(self.project.short_description.as_deref());
        fields.extend(self.project.description.as_deref());
        fields.extend(self.technologies.iter().map(String::as_str));
        fields
    }
}

impl Listable for BlogPostResponse {
    fn category(&self) -> &str {
        &self.category
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.excerpt.as_deref());
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }
}

/// Keep items matching both the category and the case-insensitive substring search
/// A missing, empty or "all" category and an empty search match everything
pub fn filter_items<'a, T: Listable>(
    items: &'a [T],
    search: Option<&str>,
    category: Option<&str>,
) -> Vec<&'a T> {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let category = category
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES));

    items
        .iter()
        .filter(|item| match category {
            Some(c) => item.category().eq_ignore_ascii_case(c),
            None => true,
        })
        .filter(|item| match &needle {
            Some(n) => item
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(n.as_str())),
            None => true,
        })
        .collect()
}

/// Slice one page out of an already filtered list
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> (Vec<T>, Pagination) {
    let pagination = Pagination::new(request, items.len() as i64);
    let start = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let page = if start < items.len() {
        let end = start.saturating_add(request.per_page as usize).min(items.len());
        items[start..end].to_vec()
    } else {
        Vec::new()
    };
    (page, pagination)
}

/// Distinct categories in first-seen order, for building filter buttons
pub fn categories<T: Listable>(items: &[T]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        let category = item.category();
        if !seen.iter().any(|c| c.eq_ignore_ascii_case(category)) {
            seen.push(category.to_string());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Project;
    use chrono::Utc;

    fn project(title: &str, category: &str, technologies: &[&str]) -> ProjectResponse {
        let now = Utc::now();
        ProjectResponse {
            project: Project {
                id: 1,
                title: title.to_string(),
                slug: crate::models::slugify(title),
                short_description: Some(format!("{} summary", title)),
                description: None,
                category: category.to_string(),
                status: "completed".to_string(),
                thumbnail_url: None,
                github_url: None,
                live_url: None,
                featured: false,
                display_order: 0,
                created_at: now,
                updated_at: now,
            },
            technologies: technologies.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn sample() -> Vec<ProjectResponse> {
        vec![
            project("Weather Dashboard", "web", &["JavaScript", "Chart.js"]),
            project("Packet Sniffer", "systems", &["Rust", "libpcap"]),
            project("Shop Backend", "web", &["PHP", "MySQL"]),
        ]
    }

    #[test]
    fn test_page_request_clamps() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, per_page: DEFAULT_PER_PAGE });
        assert_eq!(PageRequest::new(Some(0), Some(1000)).per_page, MAX_PER_PAGE);
        assert_eq!(PageRequest::new(Some(-3), Some(0)), PageRequest { page: 1, per_page: 1 });
        assert_eq!(PageRequest::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn test_huge_page_number_does_not_overflow() {
        let request = PageRequest::new(Some(i64::MAX), Some(MAX_PER_PAGE));
        assert_eq!(request.offset(), i64::MAX);

        let items: Vec<i32> = (1..=5).collect();
        let (page, meta) = paginate(&items, request);
        assert!(page.is_empty());
        assert_eq!(meta.total_pages, 1);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_pagination_metadata() {
        let p = Pagination::new(PageRequest::new(Some(1), Some(10)), 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_more);

        let last = Pagination::new(PageRequest::new(Some(3), Some(10)), 25);
        assert!(!last.has_more);

        let empty = Pagination::new(PageRequest::new(None, None), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_more);
    }

    #[test]
    fn test_filter_by_category() {
        let items = sample();
        assert_eq!(filter_items(&items, None, Some("web")).len(), 2);
        assert_eq!(filter_items(&items, None, Some("all")).len(), 3);
        assert_eq!(filter_items(&items, None, Some("")).len(), 3);
        assert_eq!(filter_items(&items, None, Some("WEB")).len(), 2);
    }

    #[test]
    fn test_search_matches_technologies_case_insensitively() {
        let items = sample();
        let found = filter_items(&items, Some("rust"), None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].project.title, "Packet Sniffer");

        let combined = filter_items(&items, Some("mysql"), Some("systems"));
        assert!(combined.is_empty());
    }

    #[test]
    fn test_paginate_slices() {
        let items: Vec<i32> = (1..=7).collect();
        let (page, meta) = paginate(&items, PageRequest::new(Some(2), Some(3)));
        assert_eq!(page, vec![4, 5, 6]);
        assert_eq!(meta.total_pages, 3);

        let (beyond, _) = paginate(&items, PageRequest::new(Some(9), Some(3)));
        assert!(beyond.is_empty());
    }

    #[test]
    fn test_categories_in_first_seen_order() {
        assert_eq!(categories(&sample()), vec!["web", "systems"]);
    }
}
