// src/handlers/contact.rs
// DOCUMENTATION: Contact form intake and admin triage endpoints

use crate::errors::PortfolioError;
use crate::handlers::AdminSession;
use crate::models::{ApiResponse, ContactQuery, CreateContactRequest, UpdateContactStatusRequest};
use crate::services::ContactService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::MySqlPool;

/// POST /api/contact
/// Store a submission with the sender's IP and user agent
pub async fn submit_contact(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    body: web::Json<CreateContactRequest>,
) -> Result<impl Responder, PortfolioError> {
    let client = super::client_info(&req);
    let submission = ContactService::submit(pool.get_ref(), body.into_inner(), &client).await?;
    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        submission,
        "Thank you for your message. I will get back to you soon.",
    )))
}

/// GET /api/contact
pub async fn list_submissions(
    _admin: AdminSession,
    pool: web::Data<MySqlPool>,
    query: web::Query<ContactQuery>,
) -> Result<impl Responder, PortfolioError> {
    let page = ContactService::list(pool.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// PUT /api/contact/{id}
/// Change the triage status of a submission
pub async fn update_submission(
    admin: AdminSession,
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateContactStatusRequest>,
) -> Result<impl Responder, PortfolioError> {
    let id = path.into_inner();
    let submission = ContactService::update_status(pool.get_ref(), id, body.into_inner()).await?;
    admin
        .record(
            pool.get_ref(),
            &req,
            "update_status",
            "contact_submission",
            Some(id),
            Some(submission.status.clone()),
        )
        .await;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(submission)))
}

/// DELETE /api/contact/{id}
pub async fn delete_submission(
    admin: AdminSession,
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<impl Responder, PortfolioError> {
    let id = path.into_inner();
    ContactService::delete(pool.get_ref(), id).await?;
    admin
        .record(pool.get_ref(), &req, "delete", "contact_submission", Some(id), None)
        .await;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message((), "Submission deleted")))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/contact")
            .route("", web::post().to(submit_contact))
            .route("", web::get().to(list_submissions))
            .route("/{id}", web::put().to(update_submission))
            .route("/{id}", web::delete().to(delete_submission)),
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
    async fn test_invalid_submission_is_rejected_before_storage() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.register(cfg)).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/contact")
            .set_json(json!({"name": "A", "email": "not-an-email", "message": "short"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("email"));
        assert!(message.contains("name"));
    }

    #[actix_web::test]
    async fn test_listing_requires_session() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.register(cfg)).configure(config)).await;

        let req = test::TestRequest::get().uri("/api/contact").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
