// src/client/mod.rs
// DOCUMENTATION: Typed client for the portfolio API
// PURPOSE: Cached, retried reads and single-shot writes with session cookie handling

pub mod cache;
pub mod error;
pub mod fetcher;

pub use cache::{CacheStats, RequestCache, DEFAULT_TTL};
pub use error::{ClientError, TransportError};
pub use fetcher::{
    cache_key, HttpTransport, RequestOptions, RetryPolicy, RetryingFetcher, Transport,
    TransportResponse,
};

use crate::db::DeletedProjectRows;
use crate::models::{
    AdminUserResponse, ApiResponse, BlogPostResponse, BlogQuery, ContactQuery, ContactSubmission,
    CreateBlogPostRequest, CreateContactRequest, CreateProjectRequest, DashboardStats,
    LoginRequest, Paginated, ProjectDetailResponse, ProjectQuery, ProjectResponse, SessionStatus,
    UpdateBlogPostRequest, UpdateProjectRequest, UpdateSettingsRequest,
};
use crate::services::listing::MAX_PER_PAGE;
use crate::services::session::SESSION_COOKIE;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const PROJECTS: &str = "/api/projects";
const BLOG: &str = "/api/blog";
const SETTINGS: &str = "/api/settings";
const CONTACT: &str = "/api/contact";
const ADMIN: &str = "/api/admin";

type Query<'a> = Vec<(&'a str, String)>;

/// Portfolio API client
/// DOCUMENTATION: GET requests go through the cache and the retry loop.
/// POST/PUT/DELETE are sent once, never cached, and invalidate their resource afterwards
pub struct PortfolioClient<T = HttpTransport> {
    base_url: Url,
    fetcher: RetryingFetcher<T>,
    cache: RequestCache<TransportResponse>,
    session: RwLock<Option<String>>,
}

impl PortfolioClient<HttpTransport> {
    /// Client over HTTP with the default retry policy and cache TTL
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(DEFAULT_TIMEOUT)?;
        Self::with_transport(base_url, transport, RetryPolicy::default(), DEFAULT_TTL)
    }
}

impl<T: Transport> PortfolioClient<T> {
    pub fn with_transport(
        base_url: &str,
        transport: T,
        policy: RetryPolicy,
        cache_ttl: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::Config(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!("'{}' cannot be used as a base URL", base_url)));
        }

        Ok(Self {
            base_url,
            fetcher: RetryingFetcher::new(transport, policy),
            cache: RequestCache::new(cache_ttl),
            session: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.session.read().await.is_some()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Drop cached responses whose key contains `pattern`, or all of them
    pub async fn invalidate_cache(&self, pattern: Option<&str>) -> usize {
        self.cache.invalidate(pattern).await
    }

    /// GET /health, uncached and unwrapped
    pub async fn health(&self) -> Result<Value, ClientError> {
        let url = self.url("/health", &[])?;
        let response = self
            .fetcher
            .fetch_with_policy(&url, &RequestOptions::get(), RetryPolicy::once())
            .await?;
        serde_json::from_str(&response.body).map_err(|e| ClientError::Decode {
            endpoint: url,
            message: e.to_string(),
        })
    }

    // ---- public reads ----

    pub async fn projects(&self, query: &ProjectQuery) -> Result<Paginated<ProjectResponse>, ClientError> {
        let mut params = Query::new();
        push_param(&mut params, "category", query.category.as_ref());
        push_param(&mut params, "status", query.status.as_ref());
        push_param(&mut params, "featured", query.featured.as_ref());
        push_param(&mut params, "search", query.search.as_ref());
        push_param(&mut params, "page", query.page.as_ref());
        push_param(&mut params, "limit", query.limit.as_ref());
        self.read(PROJECTS, &params).await
    }

    /// One project by numeric id or slug
    pub async fn project(&self, id_or_slug: &str) -> Result<ProjectDetailResponse, ClientError> {
        self.read(&format!("{}/{}", PROJECTS, id_or_slug), &[]).await
    }

    pub async fn blog_posts(&self, query: &BlogQuery) -> Result<Paginated<BlogPostResponse>, ClientError> {
        self.read(BLOG, &blog_params(query)).await
    }

    /// Every project matching the filters, walking pages until `has_more` is false
    pub async fn all_projects(&self, query: &ProjectQuery) -> Result<Vec<ProjectResponse>, ClientError> {
        collect_pages(|page| {
            let query = ProjectQuery {
                page: Some(page),
                limit: Some(MAX_PER_PAGE),
                ..query.clone()
            };
            async move { self.projects(&query).await }
        })
        .await
    }

    /// Every published post matching the filters, walking pages until `has_more` is false
    pub async fn all_blog_posts(&self, query: &BlogQuery) -> Result<Vec<BlogPostResponse>, ClientError> {
        collect_pages(|page| {
            let query = BlogQuery {
                page: Some(page),
                limit: Some(MAX_PER_PAGE),
                ..query.clone()
            };
            async move { self.blog_posts(&query).await }
        })
        .await
    }

    pub async fn blog_post(&self, slug: &str) -> Result<BlogPostResponse, ClientError> {
        self.read(&format!("{}/{}", BLOG, slug), &[]).await
    }

    pub async fn settings(&self) -> Result<BTreeMap<String, Option<String>>, ClientError> {
        self.read(SETTINGS, &[]).await
    }

    pub async fn submit_contact(&self, req: &CreateContactRequest) -> Result<ContactSubmission, ClientError> {
        self.write(RequestOptions::post(to_body(req)?), CONTACT, &[CONTACT, ADMIN])
            .await
    }

    // ---- session ----

    /// Log in and keep the session cookie for later requests
    pub async fn login(&self, username: &str, password: &str) -> Result<AdminUserResponse, ClientError> {
        let body = to_body(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        let url = self.url("/api/login", &[])?;
        let response = self
            .fetcher
            .fetch_with_policy(&url, &RequestOptions::post(body), RetryPolicy::once())
            .await?;

        let cookie = session_cookie(&response).ok_or_else(|| ClientError::Decode {
            endpoint: url.clone(),
            message: format!("login succeeded without a {} cookie", SESSION_COOKIE),
        })?;
        *self.session.write().await = Some(cookie);
        self.cache.invalidate(None).await;

        decode(&url, &response)
    }

    /// Close the server session; the local cookie and cache are cleared either way
    pub async fn logout(&self) -> Result<(), ClientError> {
        let url = self.url("/api/logout", &[])?;
        let options = self.with_session(RequestOptions::post(Value::Null)).await;
        let result = self
            .fetcher
            .fetch_with_policy(&url, &options, RetryPolicy::once())
            .await;

        *self.session.write().await = None;
        self.cache.invalidate(None).await;

        result.map(|_| ())
    }

    /// Current authentication state, never served from the cache
    pub async fn session(&self) -> Result<SessionStatus, ClientError> {
        let url = self.url("/api/session", &[])?;
        let options = self.with_session(RequestOptions::get()).await;
        let response = self.fetcher.fetch_with_retry(&url, &options).await?;
        decode(&url, &response)
    }

    // ---- admin ----

    pub async fn create_project(&self, req: &CreateProjectRequest) -> Result<ProjectDetailResponse, ClientError> {
        self.write(RequestOptions::post(to_body(req)?), PROJECTS, &[PROJECTS, ADMIN])
            .await
    }

    pub async fn update_project(
        &self,
        id: i64,
        req: &UpdateProjectRequest,
    ) -> Result<ProjectDetailResponse, ClientError> {
        self.write(
            RequestOptions::put(to_body(req)?),
            &format!("{}/{}", PROJECTS, id),
            &[PROJECTS, ADMIN],
        )
        .await
    }

    pub async fn delete_project(&self, id: i64) -> Result<DeletedProjectRows, ClientError> {
        self.write(RequestOptions::delete(), &format!("{}/{}", PROJECTS, id), &[PROJECTS, ADMIN])
            .await
    }

    /// Posts of every status
    pub async fn admin_blog_posts(&self, query: &BlogQuery) -> Result<Paginated<BlogPostResponse>, ClientError> {
        let mut params = blog_params(query);
        push_param(&mut params, "status", query.status.as_ref());
        self.read(&format!("{}/admin", BLOG), &params).await
    }

    pub async fn create_blog_post(&self, req: &CreateBlogPostRequest) -> Result<BlogPostResponse, ClientError> {
        self.write(RequestOptions::post(to_body(req)?), BLOG, &[BLOG, ADMIN]).await
    }

    pub async fn update_blog_post(
        &self,
        id: i64,
        req: &UpdateBlogPostRequest,
    ) -> Result<BlogPostResponse, ClientError> {
        self.write(
            RequestOptions::put(to_body(req)?),
            &format!("{}/{}", BLOG, id),
            &[BLOG, ADMIN],
        )
        .await
    }

    pub async fn delete_blog_post(&self, id: i64) -> Result<(), ClientError> {
        self.write::<Value>(RequestOptions::delete(), &format!("{}/{}", BLOG, id), &[BLOG, ADMIN])
            .await
            .map(|_| ())
    }

    /// Upsert settings; returns every setting after the write
    pub async fn update_settings(
        &self,
        req: &UpdateSettingsRequest,
    ) -> Result<BTreeMap<String, Option<String>>, ClientError> {
        self.write(RequestOptions::put(to_body(req)?), SETTINGS, &[SETTINGS, ADMIN])
            .await
    }

    pub async fn contact_submissions(
        &self,
        query: &ContactQuery,
    ) -> Result<Paginated<ContactSubmission>, ClientError> {
        let mut params = Query::new();
        push_param(&mut params, "status", query.status.as_ref());
        push_param(&mut params, "page", query.page.as_ref());
        push_param(&mut params, "limit", query.limit.as_ref());
        self.read(CONTACT, &params).await
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ClientError> {
        self.read(&format!("{}/stats", ADMIN), &[]).await
    }

    // ---- plumbing ----

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<String, ClientError> {
        let mut url = self.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}{}", base_path, path));
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url.to_string())
    }

    async fn with_session(&self, options: RequestOptions) -> RequestOptions {
        let options = options.with_header("accept", "application/json");
        match self.session.read().await.as_deref() {
            Some(id) => options.with_header("cookie", format!("{}={}", SESSION_COOKIE, id)),
            None => options,
        }
    }

    /// Cached GET with retries
    async fn read<R: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<R, ClientError> {
        let url = self.url(path, params)?;
        let options = self.with_session(RequestOptions::get()).await;
        let key = cache_key(&url, &options);

        let response = match self.cache.get(&key).await {
            Some(hit) => hit,
            None => {
                let response = self.fetcher.fetch_with_retry(&url, &options).await?;
                self.cache.put(key, response.clone()).await;
                response
            }
        };

        decode(&url, &response)
    }

    /// Single-shot mutation followed by invalidation of the affected resources
    async fn write<R: DeserializeOwned>(
        &self,
        options: RequestOptions,
        path: &str,
        invalidates: &[&str],
    ) -> Result<R, ClientError> {
        let url = self.url(path, &[])?;
        let options = self.with_session(options).await;
        let response = self
            .fetcher
            .fetch_with_policy(&url, &options, RetryPolicy::once())
            .await?;

        for resource in invalidates {
            self.cache.invalidate(Some(resource)).await;
        }

        decode(&url, &response)
    }
}

fn push_param<'a, V: ToString>(params: &mut Query<'a>, name: &'a str, value: Option<&V>) {
    if let Some(value) = value {
        params.push((name, value.to_string()));
    }
}

fn blog_params(query: &BlogQuery) -> Query<'_> {
    let mut params = Query::new();
    push_param(&mut params, "category", query.category.as_ref());
    push_param(&mut params, "tag", query.tag.as_ref());
    push_param(&mut params, "search", query.search.as_ref());
    push_param(&mut params, "page", query.page.as_ref());
    push_param(&mut params, "limit", query.limit.as_ref());
    params
}

fn to_body<S: Serialize>(value: &S) -> Result<Value, ClientError> {
    serde_json::to_value(value).map_err(|e| ClientError::Config(format!("could not encode request body: {}", e)))
}

/// Unwrap the `{success, data}` envelope; an empty body decodes as JSON null
fn decode<R: DeserializeOwned>(endpoint: &str, response: &TransportResponse) -> Result<R, ClientError> {
    let decode_error = |e: serde_json::Error| ClientError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    };

    if response.body.trim().is_empty() {
        return serde_json::from_value(Value::Null).map_err(decode_error);
    }

    let envelope: ApiResponse<R> = serde_json::from_str(&response.body).map_err(decode_error)?;
    if !envelope.success {
        return Err(ClientError::Decode {
            endpoint: endpoint.to_string(),
            message: envelope
                .message
                .unwrap_or_else(|| "server reported failure".to_string()),
        });
    }
    Ok(envelope.data)
}

/// Session id from a `Set-Cookie: portfolio_session=...` header, if non-empty
fn session_cookie(response: &TransportResponse) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE);
    response
        .header_values("set-cookie")
        .filter_map(|header| header.strip_prefix(prefix.as_str()))
        .map(|rest| rest.split(';').next().unwrap_or_default().trim().to_string())
        .find(|value| !value.is_empty())
}

async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, ClientError>
where
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = Result<Paginated<T>, ClientError>>,
{
    let mut items = Vec::new();
    let mut page = 1;
    loop {
        let batch = fetch(page).await?;
        let done = !batch.pagination.has_more || batch.items.is_empty();
        items.extend(batch.items);
        if done {
            return Ok(items);
        }
        page = batch.pagination.page + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::fetcher::mock::{json_response, MockTransport};
    use super::*;
    use serde_json::json;

    const BASE: &str = "http://portfolio.test";

    fn client(ttl: Duration) -> PortfolioClient<MockTransport> {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(5),
        };
        PortfolioClient::with_transport(BASE, MockTransport::new(), policy, ttl).unwrap()
    }

    fn transport(client: &PortfolioClient<MockTransport>) -> &MockTransport {
        client.fetcher.transport()
    }

    fn empty_page() -> Value {
        json!({
            "success": true,
            "data": {
                "items": [],
                "pagination": {"page": 1, "per_page": 12, "total": 0, "total_pages": 0, "has_more": false}
            }
        })
    }

    fn project_detail() -> Value {
        json!({
            "success": true,
            "data": {
                "id": 7,
                "title": "Portfolio API",
                "slug": "portfolio-api",
                "short_description": null,
                "description": null,
                "category": "web",
                "status": "completed",
                "thumbnail_url": null,
                "github_url": null,
                "live_url": null,
                "featured": false,
                "display_order": 0,
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z",
                "technologies": ["Rust"],
                "features": [],
                "challenges": [],
                "gallery": []
            }
        })
    }

    fn create_request() -> CreateProjectRequest {
        serde_json::from_value(json!({"title": "Portfolio API", "category": "web"})).unwrap()
    }

    #[tokio::test]
    async fn test_read_is_cached_within_ttl() {
        let client = client(Duration::from_millis(100));
        transport(&client).always(json_response(200, empty_page()));

        client.projects(&ProjectQuery::default()).await.unwrap();
        client.projects(&ProjectQuery::default()).await.unwrap();
        assert_eq!(transport(&client).call_count(), 1);

        tokio::time::sleep(Duration::from_millis(150)).await;

        client.projects(&ProjectQuery::default()).await.unwrap();
        assert_eq!(transport(&client).call_count(), 2);
    }

    #[tokio::test]
    async fn test_all_projects_follows_pagination() {
        let client = client(Duration::from_secs(60));
        let item = |id: i64| {
            let mut detail = project_detail()["data"].clone();
            detail["id"] = json!(id);
            detail
        };
        let page = |n: i64, items: Vec<Value>, has_more: bool| {
            json!({
                "success": true,
                "data": {
                    "items": items,
                    "pagination": {"page": n, "per_page": 100, "total": 3, "total_pages": 2, "has_more": has_more}
                }
            })
        };
        transport(&client)
            .push(Ok(json_response(200, page(1, vec![item(1), item(2)], true))))
            .push(Ok(json_response(200, page(2, vec![item(3)], false))));

        let query = ProjectQuery {
            category: Some("web".into()),
            ..Default::default()
        };
        let all = client.all_projects(&query).await.unwrap();
        assert_eq!(all.iter().map(|p| p.project.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        let calls = transport(&client).calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "http://portfolio.test/api/projects?category=web&page=1&limit=100");
        assert_eq!(calls[1].0, "http://portfolio.test/api/projects?category=web&page=2&limit=100");
    }

    #[tokio::test]
    async fn test_query_parameters_are_encoded() {
        let client = client(Duration::from_secs(60));
        transport(&client).always(json_response(200, empty_page()));

        let query = ProjectQuery {
            search: Some("rust & sql".into()),
            page: Some(2),
            ..Default::default()
        };
        client.projects(&query).await.unwrap();

        let calls = transport(&client).calls();
        assert_eq!(calls[0].0, "http://portfolio.test/api/projects?search=rust+%26+sql&page=2");
    }

    #[tokio::test]
    async fn test_writes_are_not_cached_and_invalidate() {
        let client = client(Duration::from_secs(60));
        let mock = transport(&client);
        mock.push(Ok(json_response(200, empty_page())))
            .push(Ok(json_response(201, project_detail())))
            .push(Ok(json_response(201, project_detail())))
            .push(Ok(json_response(200, empty_page())));

        client.projects(&ProjectQuery::default()).await.unwrap();
        assert_eq!(client.cache_stats().await.total_entries, 1);

        let created = client.create_project(&create_request()).await.unwrap();
        assert_eq!(created.project.slug, "portfolio-api");
        client.create_project(&create_request()).await.unwrap();
        assert_eq!(client.cache_stats().await.total_entries, 0);

        client.projects(&ProjectQuery::default()).await.unwrap();
        assert_eq!(mock.call_count(), 4);
    }

    #[tokio::test]
    async fn test_write_failure_is_not_retried() {
        let client = client(Duration::from_secs(60));
        transport(&client).always(json_response(500, json!({"success": false, "message": "Internal server error"})));

        let err = client.delete_project(3).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(transport(&client).call_count(), 1);
    }

    #[tokio::test]
    async fn test_login_keeps_cookie_and_clears_cache() {
        let client = client(Duration::from_secs(60));
        let mock = transport(&client);

        let mut login = json_response(
            200,
            json!({
                "success": true,
                "data": {"id": 1, "username": "admin", "email": "admin@example.com", "full_name": null, "role": "admin"}
            }),
        );
        login.headers.push((
            "set-cookie".to_string(),
            "portfolio_session=abc123; HttpOnly; SameSite=Lax; Path=/".to_string(),
        ));

        mock.push(Ok(json_response(200, json!({"success": true, "data": {"site_title": "Mine"}}))))
            .push(Ok(login))
            .push(Ok(json_response(
                200,
                json!({"success": true, "data": {
                    "total_projects": 3, "featured_projects": 1, "published_posts": 2,
                    "draft_posts": 0, "new_messages": 1, "total_messages": 4, "visits_last_30_days": 10
                }}),
            )));

        client.settings().await.unwrap();
        let user = client.login("admin", "secret").await.unwrap();
        assert_eq!(user.username, "admin");
        assert!(client.is_logged_in().await);
        assert_eq!(client.cache_stats().await.total_entries, 0);

        let stats = client.dashboard_stats().await.unwrap();
        assert_eq!(stats.total_projects, 3);

        let calls = mock.calls();
        assert_eq!(
            calls[2].1.headers.get("cookie").map(String::as_str),
            Some("portfolio_session=abc123")
        );
    }

    #[tokio::test]
    async fn test_failed_login_sets_no_session() {
        let client = client(Duration::from_secs(60));
        transport(&client).push(Ok(json_response(
            401,
            json!({"success": false, "message": "Invalid username or password"}),
        )));

        let err = client.login("admin", "wrong").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(!client.is_logged_in().await);
        assert_eq!(transport(&client).call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_body_decodes_for_unit_results() {
        let client = client(Duration::from_secs(60));
        transport(&client).push(Ok(TransportResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        }));

        client.delete_blog_post(4).await.unwrap();
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let result = PortfolioClient::with_transport(
            "not a url",
            MockTransport::new(),
            RetryPolicy::default(),
            DEFAULT_TTL,
        );
        assert!(matches!(result, Err(ClientError::Config(_))));
    }
}
