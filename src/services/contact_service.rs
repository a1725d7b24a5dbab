// src/services/contact_service.rs
// DOCUMENTATION: Contact form intake and admin triage

use crate::db::ContactRepository;
use crate::errors::PortfolioError;
use crate::models::{
    ClientInfo, ContactQuery, ContactSubmission, CreateContactRequest, Paginated,
    UpdateContactStatusRequest,
};
use crate::services::listing::{PageRequest, Pagination};
use sqlx::MySqlPool;
use validator::Validate;

pub struct ContactService;

impl ContactService {
    pub async fn submit(
        pool: &MySqlPool,
        req: CreateContactRequest,
        client: &ClientInfo,
    ) -> Result<ContactSubmission, PortfolioError> {
        req.validate()?;
        if req.message.trim().len() < 10 {
            return Err(PortfolioError::ValidationError(
                "message: Message must be between 10 and 5000 characters".to_string(),
            ));
        }

        let id = ContactRepository::create(pool, &req, client).await?;
        log::info!("New contact submission {} from {}", id, req.email);
        ContactRepository::get_by_id(pool, id).await
    }

    pub async fn list(
        pool: &MySqlPool,
        query: ContactQuery,
    ) -> Result<Paginated<ContactSubmission>, PortfolioError> {
        let page = PageRequest::new(query.page, query.limit);
        let (items, total) = ContactRepository::list(pool, &query, page).await?;
        Ok(Paginated {
            items,
            pagination: Pagination::new(page, total),
        })
    }

    pub async fn update_status(
        pool: &MySqlPool,
        id: i64,
        req: UpdateContactStatusRequest,
    ) -> Result<ContactSubmission, PortfolioError> {
        req.validate()?;
        // 404 before writing
        ContactRepository::get_by_id(pool, id).await?;
        ContactRepository::update_status(pool, id, &req.status).await?;
        ContactRepository::get_by_id(pool, id).await
    }

    pub async fn delete(pool: &MySqlPool, id: i64) -> Result<(), PortfolioError> {
        ContactRepository::delete(pool, id).await
    }
}
