// src/handlers/blog.rs
// DOCUMENTATION: HTTP handlers for blog posts
// PURPOSE: Public reading endpoints and admin authoring endpoints

use crate::errors::PortfolioError;
use crate::handlers::AdminSession;
use crate::models::{ApiResponse, BlogQuery, CreateBlogPostRequest, UpdateBlogPostRequest};
use crate::services::BlogService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::MySqlPool;

/// GET /api/blog
/// Published posts, newest first
pub async fn list_posts(
    pool: web::Data<MySqlPool>,
    query: web::Query<BlogQuery>,
) -> Result<impl Responder, PortfolioError> {
    let page = BlogService::list_published(pool.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// GET /api/blog/admin
/// Posts of every status for the dashboard
pub async fn list_all_posts(
    _admin: AdminSession,
    pool: web::Data<MySqlPool>,
    query: web::Query<BlogQuery>,
) -> Result<impl Responder, PortfolioError> {
    let page = BlogService::list_all(pool.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// GET /api/blog/categories
pub async fn list_categories(pool: web::Data<MySqlPool>) -> Result<impl Responder, PortfolioError> {
    let categories = BlogService::categories(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(categories)))
}

/// GET /api/blog/{slug}
/// Counts a view on every read
pub async fn get_post(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<impl Responder, PortfolioError> {
    let post = BlogService::read(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// POST /api/blog
pub async fn create_post(
    admin: AdminSession,
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    body: web::Json<CreateBlogPostRequest>,
) -> Result<impl Responder, PortfolioError> {
    let post = BlogService::create(pool.get_ref(), body.into_inner()).await?;
    admin
        .record(pool.get_ref(), &req, "create", "blog_post", Some(post.id), Some(post.title.clone()))
        .await;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(post, "Post created")))
}

/// PUT /api/blog/{id}
pub async fn update_post(
    admin: AdminSession,
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateBlogPostRequest>,
) -> Result<impl Responder, PortfolioError> {
    let id = path.into_inner();
    let post = BlogService::update(pool.get_ref(), id, body.into_inner()).await?;
    admin
        .record(pool.get_ref(), &req, "update", "blog_post", Some(id), Some(post.title.clone()))
        .await;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(post, "Post updated")))
}

/// DELETE /api/blog/{id}
pub async fn delete_post(
    admin: AdminSession,
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<impl Responder, PortfolioError> {
    let id = path.into_inner();
    BlogService::delete(pool.get_ref(), id).await?;
    admin
        .record(pool.get_ref(), &req, "delete", "blog_post", Some(id), None)
        .await;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message((), "Post deleted")))
}

/// Static segments are registered before `/{slug}` so they win
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/blog")
            .route("", web::get().to(list_posts))
            .route("", web::post().to(create_post))
            .route("/admin", web::get().to(list_all_posts))
            .route("/categories", web::get().to(list_categories))
            .route("/{slug}", web::get().to(get_post))
            .route("/{id}", web::put().to(update_post))
            .route("/{id}", web::delete().to(delete_post)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::TestState;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_admin_listing_requires_session() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.register(cfg)).configure(config)).await;

        let req = test::TestRequest::get().uri("/api/blog/admin").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::delete().uri("/api/blog/5").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
