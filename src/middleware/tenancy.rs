// src/middleware/tenancy.rs

use axum::{
    extract::{RawPathParams, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{common::error::AppError, middleware::auth::CurrentCaller, models::auth::Caller};

// O nome do parâmetro de caminho que identifica o tenant
const TENANT_PARAM: &str = "tenant_uuid";

/// Chamadores de um tenant só enxergam o próprio tenant. Root passa direto.
/// Precisa ser `route_layer`: os parâmetros só existem depois do roteamento.
pub async fn tenant_guard(
    CurrentCaller(caller): CurrentCaller,
    params: RawPathParams,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let requested = params
        .iter()
        .find(|(key, _)| *key == TENANT_PARAM)
        .and_then(|(_, value)| Uuid::parse_str(value).ok());

    let allowed = match requested {
        Some(tenant_uuid) => caller.can_access_tenant(tenant_uuid),
        // Sem tenant no caminho (ou um id inválido): só root.
        None => caller == Caller::Root,
    };
    if !allowed {
        tracing::warn!("{:?} tentou acessar o tenant {:?}", caller, requested);
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
