// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod admin_service;
pub mod auth_service;
pub mod blog_service;
pub mod contact_service;
pub mod listing;
pub mod project_service;
pub mod session;

pub use admin_service::*;
pub use auth_service::*;
pub use blog_service::*;
pub use contact_service::*;
pub use project_service::*;
pub use session::*;
