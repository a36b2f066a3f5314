pub mod credential;
pub mod identity;
pub mod rbac;
pub mod tenancy;
