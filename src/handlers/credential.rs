// src/handlers/credential.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        ids::parse_path_id,
        payload::Payload,
        response::{Envelope, Listing, Single},
    },
    config::AppState,
    models::credential::{
        IssuedMultipass, IssuedPassword, MultipassPayload, MultipassView, OwnerType,
        PasswordPayload, PasswordView,
    },
};

// Credenciais são imutáveis: PUT/POST no item sempre responde 405.
pub async fn credential_update_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

fn owner_ids(tenant_uuid: &str, owner_uuid: &str) -> Result<(Uuid, Uuid), AppError> {
    Ok((
        parse_path_id(tenant_uuid, "tenant")?,
        parse_path_id(owner_uuid, "owner")?,
    ))
}

async fn issue_multipass(
    app_state: &AppState,
    owner_type: OwnerType,
    (tenant_uuid, owner_uuid): (String, String),
    payload: MultipassPayload,
) -> Result<(StatusCode, Json<Envelope<IssuedMultipass>>), AppError> {
    let (tenant_uuid, owner_uuid) = owner_ids(&tenant_uuid, &owner_uuid)?;
    let issued = app_state
        .credential_service
        .create_multipass(tenant_uuid, owner_type, owner_uuid, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(Envelope { data: issued })))
}

async fn multipass_listing(
    app_state: &AppState,
    owner_type: OwnerType,
    (tenant_uuid, owner_uuid): (String, String),
) -> Result<Listing<MultipassView>, AppError> {
    let (tenant_uuid, owner_uuid) = owner_ids(&tenant_uuid, &owner_uuid)?;
    let multipasses = app_state
        .credential_service
        .list_multipasses(tenant_uuid, owner_type, owner_uuid)
        .await?;
    Ok(Listing(multipasses))
}

async fn multipass_single(
    app_state: &AppState,
    owner_type: OwnerType,
    (tenant_uuid, owner_uuid, multipass_uuid): (String, String, String),
) -> Result<Single<MultipassView>, AppError> {
    let (tenant_uuid, owner_uuid) = owner_ids(&tenant_uuid, &owner_uuid)?;
    let multipass_uuid = parse_path_id(&multipass_uuid, "multipass")?;
    let multipass = app_state
        .credential_service
        .read_multipass(tenant_uuid, owner_type, owner_uuid, multipass_uuid)
        .await?;
    Ok(Single::ok(multipass))
}

async fn revoke_multipass(
    app_state: &AppState,
    owner_type: OwnerType,
    (tenant_uuid, owner_uuid, multipass_uuid): (String, String, String),
) -> Result<StatusCode, AppError> {
    let (tenant_uuid, owner_uuid) = owner_ids(&tenant_uuid, &owner_uuid)?;
    let multipass_uuid = parse_path_id(&multipass_uuid, "multipass")?;
    app_state
        .credential_service
        .delete_multipass(tenant_uuid, owner_type, owner_uuid, multipass_uuid)
        .await?;
    tracing::info!("🗑️ Multipass {} revogado", multipass_uuid);
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Multipasses de usuários
// ---
#[utoipa::path(
    post,
    path = "/tenant/{tenant_uuid}/user/{user_uuid}/multipass",
    tag = "Multipasses",
    request_body = MultipassPayload,
    responses(
        (status = 201, description = "Multipass emitido (token e salt só aparecem aqui)", body = IssuedMultipass),
        (status = 400, description = "ttl ausente ou CIDR inválido"),
        (status = 404, description = "Usuário não encontrado")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("user_uuid" = String, Path, description = "ID do usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user_multipass(
    State(app_state): State<AppState>,
    Path(ids): Path<(String, String)>,
    Payload(payload): Payload<MultipassPayload>,
) -> Result<impl IntoResponse, AppError> {
    issue_multipass(&app_state, OwnerType::User, ids, payload).await
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/user/{user_uuid}/multipass",
    tag = "Multipasses",
    responses((status = 200, description = "Multipasses do usuário", body = [MultipassView])),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("user_uuid" = String, Path, description = "ID do usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_user_multipasses(
    State(app_state): State<AppState>,
    Path(ids): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    multipass_listing(&app_state, OwnerType::User, ids).await
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/user/{user_uuid}/multipass/{multipass_uuid}",
    tag = "Multipasses",
    responses(
        (status = 200, description = "Multipass (sem segredos)", body = MultipassView),
        (status = 404, description = "Não encontrado para este usuário")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("user_uuid" = String, Path, description = "ID do usuário"),
        ("multipass_uuid" = String, Path, description = "ID do multipass")
    ),
    security(("api_jwt" = []))
)]
pub async fn read_user_multipass(
    State(app_state): State<AppState>,
    Path(ids): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    multipass_single(&app_state, OwnerType::User, ids).await
}

#[utoipa::path(
    delete,
    path = "/tenant/{tenant_uuid}/user/{user_uuid}/multipass/{multipass_uuid}",
    tag = "Multipasses",
    responses(
        (status = 204, description = "Multipass revogado"),
        (status = 404, description = "Não encontrado para este usuário")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("user_uuid" = String, Path, description = "ID do usuário"),
        ("multipass_uuid" = String, Path, description = "ID do multipass")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user_multipass(
    State(app_state): State<AppState>,
    Path(ids): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    revoke_multipass(&app_state, OwnerType::User, ids).await
}

// ---
// Multipasses de service accounts
// ---
#[utoipa::path(
    post,
    path = "/tenant/{tenant_uuid}/service_account/{service_account_uuid}/multipass",
    tag = "Multipasses",
    request_body = MultipassPayload,
    responses(
        (status = 201, description = "Multipass emitido (token e salt só aparecem aqui)", body = IssuedMultipass),
        (status = 404, description = "Service account não encontrada")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("service_account_uuid" = String, Path, description = "ID da service account")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_service_account_multipass(
    State(app_state): State<AppState>,
    Path(ids): Path<(String, String)>,
    Payload(payload): Payload<MultipassPayload>,
) -> Result<impl IntoResponse, AppError> {
    issue_multipass(&app_state, OwnerType::ServiceAccount, ids, payload).await
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/service_account/{service_account_uuid}/multipass",
    tag = "Multipasses",
    responses((status = 200, description = "Multipasses da service account", body = [MultipassView])),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("service_account_uuid" = String, Path, description = "ID da service account")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_service_account_multipasses(
    State(app_state): State<AppState>,
    Path(ids): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    multipass_listing(&app_state, OwnerType::ServiceAccount, ids).await
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/service_account/{service_account_uuid}/multipass/{multipass_uuid}",
    tag = "Multipasses",
    responses((status = 200, description = "Multipass (sem segredos)", body = MultipassView)),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("service_account_uuid" = String, Path, description = "ID da service account"),
        ("multipass_uuid" = String, Path, description = "ID do multipass")
    ),
    security(("api_jwt" = []))
)]
pub async fn read_service_account_multipass(
    State(app_state): State<AppState>,
    Path(ids): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    multipass_single(&app_state, OwnerType::ServiceAccount, ids).await
}

#[utoipa::path(
    delete,
    path = "/tenant/{tenant_uuid}/service_account/{service_account_uuid}/multipass/{multipass_uuid}",
    tag = "Multipasses",
    responses((status = 204, description = "Multipass revogado")),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("service_account_uuid" = String, Path, description = "ID da service account"),
        ("multipass_uuid" = String, Path, description = "ID do multipass")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_service_account_multipass(
    State(app_state): State<AppState>,
    Path(ids): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    revoke_multipass(&app_state, OwnerType::ServiceAccount, ids).await
}

// ---
// Senhas de service accounts
// ---
#[utoipa::path(
    post,
    path = "/tenant/{tenant_uuid}/service_account/{service_account_uuid}/password",
    tag = "Passwords",
    request_body = PasswordPayload,
    responses(
        (status = 201, description = "Senha criada (o segredo só aparece aqui)", body = IssuedPassword),
        (status = 400, description = "ttl ausente ou CIDR inválido"),
        (status = 404, description = "Service account não encontrada")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("service_account_uuid" = String, Path, description = "ID da service account")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_password(
    State(app_state): State<AppState>,
    Path((tenant_uuid, sa_uuid)): Path<(String, String)>,
    Payload(payload): Payload<PasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    let (tenant_uuid, sa_uuid) = owner_ids(&tenant_uuid, &sa_uuid)?;
    let issued = app_state
        .credential_service
        .create_password(tenant_uuid, sa_uuid, payload)
        .await?;
    Ok(Single::created(issued))
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/service_account/{service_account_uuid}/password",
    tag = "Passwords",
    responses((status = 200, description = "Senhas da service account", body = [PasswordView])),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("service_account_uuid" = String, Path, description = "ID da service account")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_passwords(
    State(app_state): State<AppState>,
    Path((tenant_uuid, sa_uuid)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let (tenant_uuid, sa_uuid) = owner_ids(&tenant_uuid, &sa_uuid)?;
    let passwords = app_state
        .credential_service
        .list_passwords(tenant_uuid, sa_uuid)
        .await?;
    Ok(Listing(passwords))
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/service_account/{service_account_uuid}/password/{password_uuid}",
    tag = "Passwords",
    responses(
        (status = 200, description = "Senha (sem o segredo)", body = PasswordView),
        (status = 404, description = "Não encontrada para esta service account")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("service_account_uuid" = String, Path, description = "ID da service account"),
        ("password_uuid" = String, Path, description = "ID da senha")
    ),
    security(("api_jwt" = []))
)]
pub async fn read_password(
    State(app_state): State<AppState>,
    Path((tenant_uuid, sa_uuid, password_uuid)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let (tenant_uuid, sa_uuid) = owner_ids(&tenant_uuid, &sa_uuid)?;
    let password_uuid = parse_path_id(&password_uuid, "password")?;
    let password = app_state
        .credential_service
        .read_password(tenant_uuid, sa_uuid, password_uuid)
        .await?;
    Ok(Single::ok(password))
}

#[utoipa::path(
    delete,
    path = "/tenant/{tenant_uuid}/service_account/{service_account_uuid}/password/{password_uuid}",
    tag = "Passwords",
    responses(
        (status = 204, description = "Senha removida"),
        (status = 404, description = "Não encontrada para esta service account")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("service_account_uuid" = String, Path, description = "ID da service account"),
        ("password_uuid" = String, Path, description = "ID da senha")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_password(
    State(app_state): State<AppState>,
    Path((tenant_uuid, sa_uuid, password_uuid)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let (tenant_uuid, sa_uuid) = owner_ids(&tenant_uuid, &sa_uuid)?;
    let password_uuid = parse_path_id(&password_uuid, "password")?;
    app_state
        .credential_service
        .delete_password(tenant_uuid, sa_uuid, password_uuid)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
