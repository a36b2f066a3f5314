pub mod auth;
pub mod credential_service;
pub mod identity_service;
pub mod rbac_service;
pub mod tenancy_service;
