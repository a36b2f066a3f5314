// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, middleware::auth::CurrentCaller, models::auth::Caller};

/// Guardião das rotas globais (tenants, roles, feature flags): só root passa.
pub struct RequireRoot;

impl<S> FromRequestParts<S> for RequireRoot
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentCaller(caller) = CurrentCaller::from_request_parts(parts, state).await?;

        match caller {
            Caller::Root => Ok(RequireRoot),
            Caller::Tenant(_) => Err(AppError::Forbidden),
        }
    }
}
