// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{common::error::AppError, config::AppState, models::auth::Caller};

// Cabeçalho alternativo aceito pelos clientes antigos.
const VAULT_TOKEN_HEADER: &str = "x-vault-token";

/// Sem token: 400. Token desconhecido: 403. Caso contrário o `Caller` vai para as extensions.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers();
    let token = headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_owned())
        .or_else(|| {
            headers
                .get(VAULT_TOKEN_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        })
        .filter(|token| !token.trim().is_empty())
        .ok_or(AppError::MissingToken)?;

    let caller = app_state.auth_service.authenticate(&token).await?;
    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

// Extrator para obter o chamador autenticado diretamente nos handlers
#[derive(Debug, Clone, Copy)]
pub struct CurrentCaller(pub Caller);

impl<S> FromRequestParts<S> for CurrentCaller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .copied()
            .map(CurrentCaller)
            .ok_or(AppError::MissingToken)
    }
}
