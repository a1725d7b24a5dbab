// src/handlers/projects.rs
// DOCUMENTATION: HTTP handlers for project operations
// PURPOSE: Parse requests, call services, return responses

use crate::errors::PortfolioError;
use crate::handlers::AdminSession;
use crate::models::{ApiResponse, CreateProjectRequest, ProjectQuery, UpdateProjectRequest};
use crate::services::ProjectService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::MySqlPool;

/// GET /api/projects
/// List non-archived projects with optional filters
pub async fn list_projects(
    pool: web::Data<MySqlPool>,
    query: web::Query<ProjectQuery>,
) -> Result<impl Responder, PortfolioError> {
    let page = ProjectService::list(pool.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// GET /api/projects/{id_or_slug}
/// Retrieve a project by numeric id or slug, with every child collection
pub async fn get_project(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<impl Responder, PortfolioError> {
    let identifier = path.into_inner();
    let project = ProjectService::get(pool.get_ref(), &identifier).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(project)))
}

/// POST /api/projects
pub async fn create_project(
    admin: AdminSession,
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    body: web::Json<CreateProjectRequest>,
) -> Result<impl Responder, PortfolioError> {
    let project = ProjectService::create(pool.get_ref(), body.into_inner()).await?;
    admin
        .record(
            pool.get_ref(),
            &req,
            "create",
            "project",
            Some(project.project.id),
            Some(project.project.title.clone()),
        )
        .await;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(project, "Project created")))
}

/// PUT /api/projects/{id}
pub async fn update_project(
    admin: AdminSession,
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateProjectRequest>,
) -> Result<impl Responder, PortfolioError> {
    let id = path.into_inner();
    let project = ProjectService::update(pool.get_ref(), id, body.into_inner()).await?;
    admin
        .record(pool.get_ref(), &req, "update", "project", Some(id), Some(project.project.title.clone()))
        .await;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(project, "Project updated")))
}

/// DELETE /api/projects/{id}
/// Removes the project together with its links, features, challenges and gallery
pub async fn delete_project(
    admin: AdminSession,
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<impl Responder, PortfolioError> {
    let id = path.into_inner();
    let removed = ProjectService::delete(pool.get_ref(), id).await?;
    admin
        .record(
            pool.get_ref(),
            &req,
            "delete",
            "project",
            Some(id),
            Some(format!(
                "{} technology links, {} features, {} challenges, {} gallery images",
                removed.technology_links, removed.features, removed.challenges, removed.gallery_images
            )),
        )
        .await;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(removed, "Project deleted")))
}

/// Configuration for project routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/projects")
            .route("", web::get().to(list_projects))
            .route("", web::post().to(create_project))
            .route("/{id}", web::get().to(get_project))
            .route("/{id}", web::put().to(update_project))
            .route("/{id}", web::delete().to(delete_project)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::TestState;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_mutations_require_session() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.register(cfg)).configure(config)).await;

        let requests = vec![
            test::TestRequest::post()
                .uri("/api/projects")
                .set_json(json!({"title": "New", "category": "web"})),
            test::TestRequest::put()
                .uri("/api/projects/1")
                .set_json(json!({"title": "Renamed"})),
            test::TestRequest::delete().uri("/api/projects/1"),
        ];

        for req in requests {
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], "Authentication required");
        }
    }
}
