// src/handlers/identity.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    common::{
        error::AppError,
        ids::parse_path_id,
        payload::Payload,
        response::{Listing, Single},
    },
    config::AppState,
    models::identity::{
        Group, GroupPayload, ServiceAccount, ServiceAccountPayload, User, UserPayload,
    },
};

// ---
// Users
// ---
#[utoipa::path(
    post,
    path = "/tenant/{tenant_uuid}/user",
    tag = "Users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 400, description = "Payload inválido ou identifier repetido"),
        (status = 404, description = "Tenant não encontrado")
    ),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
    Payload(payload): Payload<UserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let user = app_state
        .user_service
        .create(tenant_uuid, payload, false)
        .await?;
    Ok(Single::created(user))
}

#[utoipa::path(
    post,
    path = "/tenant/{tenant_uuid}/user/privileged",
    tag = "Users",
    request_body = UserPayload,
    responses((status = 201, description = "Usuário criado com o uuid informado", body = User)),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn create_user_privileged(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
    Payload(payload): Payload<UserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let user = app_state
        .user_service
        .create(tenant_uuid, payload, true)
        .await?;
    Ok(Single::created(user))
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/user",
    tag = "Users",
    responses((status = 200, description = "Usuários do tenant", body = [User])),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    Ok(Listing(app_state.user_service.list(tenant_uuid).await?))
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/user/{user_uuid}",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário", body = User),
        (status = 404, description = "Não encontrado neste tenant")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("user_uuid" = String, Path, description = "ID do usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn read_user(
    State(app_state): State<AppState>,
    Path((tenant_uuid, user_uuid)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let user_uuid = parse_path_id(&user_uuid, "user")?;
    let user = app_state.user_service.read(tenant_uuid, user_uuid).await?;
    Ok(Single::ok(user))
}

#[utoipa::path(
    put,
    path = "/tenant/{tenant_uuid}/user/{user_uuid}",
    tag = "Users",
    request_body = UserPayload,
    responses(
        (status = 200, description = "Usuário atualizado", body = User),
        (status = 404, description = "Não encontrado neste tenant"),
        (status = 409, description = "resource_version desatualizada")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("user_uuid" = String, Path, description = "ID do usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    Path((tenant_uuid, user_uuid)): Path<(String, String)>,
    Payload(payload): Payload<UserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let user_uuid = parse_path_id(&user_uuid, "user")?;
    let user = app_state
        .user_service
        .update(tenant_uuid, user_uuid, payload)
        .await?;
    Ok(Single::ok(user))
}

#[utoipa::path(
    delete,
    path = "/tenant/{tenant_uuid}/user/{user_uuid}",
    tag = "Users",
    responses(
        (status = 204, description = "Usuário removido (e retirado de grupos e role bindings)"),
        (status = 404, description = "Não encontrado neste tenant")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("user_uuid" = String, Path, description = "ID do usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    Path((tenant_uuid, user_uuid)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let user_uuid = parse_path_id(&user_uuid, "user")?;
    app_state.user_service.delete(tenant_uuid, user_uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Service accounts
// ---
#[utoipa::path(
    post,
    path = "/tenant/{tenant_uuid}/service_account",
    tag = "Service Accounts",
    request_body = ServiceAccountPayload,
    responses(
        (status = 201, description = "Service account criada", body = ServiceAccount),
        (status = 400, description = "Payload inválido")
    ),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn create_service_account(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
    Payload(payload): Payload<ServiceAccountPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let service_account = app_state
        .service_account_service
        .create(tenant_uuid, payload, false)
        .await?;
    Ok(Single::created(service_account))
}

#[utoipa::path(
    post,
    path = "/tenant/{tenant_uuid}/service_account/privileged",
    tag = "Service Accounts",
    request_body = ServiceAccountPayload,
    responses((status = 201, description = "Service account criada com o uuid informado", body = ServiceAccount)),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn create_service_account_privileged(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
    Payload(payload): Payload<ServiceAccountPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let service_account = app_state
        .service_account_service
        .create(tenant_uuid, payload, true)
        .await?;
    Ok(Single::created(service_account))
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/service_account",
    tag = "Service Accounts",
    responses((status = 200, description = "Service accounts do tenant", body = [ServiceAccount])),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn list_service_accounts(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    Ok(Listing(
        app_state.service_account_service.list(tenant_uuid).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/service_account/{service_account_uuid}",
    tag = "Service Accounts",
    responses(
        (status = 200, description = "Service account", body = ServiceAccount),
        (status = 404, description = "Não encontrada neste tenant")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("service_account_uuid" = String, Path, description = "ID da service account")
    ),
    security(("api_jwt" = []))
)]
pub async fn read_service_account(
    State(app_state): State<AppState>,
    Path((tenant_uuid, sa_uuid)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let sa_uuid = parse_path_id(&sa_uuid, "service account")?;
    let service_account = app_state
        .service_account_service
        .read(tenant_uuid, sa_uuid)
        .await?;
    Ok(Single::ok(service_account))
}

#[utoipa::path(
    put,
    path = "/tenant/{tenant_uuid}/service_account/{service_account_uuid}",
    tag = "Service Accounts",
    request_body = ServiceAccountPayload,
    responses(
        (status = 200, description = "Service account atualizada", body = ServiceAccount),
        (status = 404, description = "Não encontrada neste tenant"),
        (status = 409, description = "resource_version desatualizada")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("service_account_uuid" = String, Path, description = "ID da service account")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_service_account(
    State(app_state): State<AppState>,
    Path((tenant_uuid, sa_uuid)): Path<(String, String)>,
    Payload(payload): Payload<ServiceAccountPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let sa_uuid = parse_path_id(&sa_uuid, "service account")?;
    let service_account = app_state
        .service_account_service
        .update(tenant_uuid, sa_uuid, payload)
        .await?;
    Ok(Single::ok(service_account))
}

#[utoipa::path(
    delete,
    path = "/tenant/{tenant_uuid}/service_account/{service_account_uuid}",
    tag = "Service Accounts",
    responses(
        (status = 204, description = "Service account removida junto com suas credenciais"),
        (status = 404, description = "Não encontrada neste tenant")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("service_account_uuid" = String, Path, description = "ID da service account")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_service_account(
    State(app_state): State<AppState>,
    Path((tenant_uuid, sa_uuid)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let sa_uuid = parse_path_id(&sa_uuid, "service account")?;
    app_state
        .service_account_service
        .delete(tenant_uuid, sa_uuid)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Groups
// ---
#[utoipa::path(
    post,
    path = "/tenant/{tenant_uuid}/group",
    tag = "Groups",
    request_body = GroupPayload,
    responses(
        (status = 201, description = "Grupo criado", body = Group),
        (status = 400, description = "Membro inexistente ou payload inválido")
    ),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn create_group(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
    Payload(payload): Payload<GroupPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let group = app_state
        .group_service
        .create(tenant_uuid, payload, false)
        .await?;
    Ok(Single::created(group))
}

#[utoipa::path(
    post,
    path = "/tenant/{tenant_uuid}/group/privileged",
    tag = "Groups",
    request_body = GroupPayload,
    responses((status = 201, description = "Grupo criado com o uuid informado", body = Group)),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn create_group_privileged(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
    Payload(payload): Payload<GroupPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let group = app_state
        .group_service
        .create(tenant_uuid, payload, true)
        .await?;
    Ok(Single::created(group))
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/group",
    tag = "Groups",
    responses((status = 200, description = "Grupos do tenant", body = [Group])),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn list_groups(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    Ok(Listing(app_state.group_service.list(tenant_uuid).await?))
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/group/{group_uuid}",
    tag = "Groups",
    responses(
        (status = 200, description = "Grupo", body = Group),
        (status = 404, description = "Não encontrado neste tenant")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("group_uuid" = String, Path, description = "ID do grupo")
    ),
    security(("api_jwt" = []))
)]
pub async fn read_group(
    State(app_state): State<AppState>,
    Path((tenant_uuid, group_uuid)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let group_uuid = parse_path_id(&group_uuid, "group")?;
    let group = app_state.group_service.read(tenant_uuid, group_uuid).await?;
    Ok(Single::ok(group))
}

#[utoipa::path(
    put,
    path = "/tenant/{tenant_uuid}/group/{group_uuid}",
    tag = "Groups",
    request_body = GroupPayload,
    responses(
        (status = 200, description = "Grupo atualizado", body = Group),
        (status = 404, description = "Não encontrado neste tenant"),
        (status = 409, description = "resource_version desatualizada")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("group_uuid" = String, Path, description = "ID do grupo")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_group(
    State(app_state): State<AppState>,
    Path((tenant_uuid, group_uuid)): Path<(String, String)>,
    Payload(payload): Payload<GroupPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let group_uuid = parse_path_id(&group_uuid, "group")?;
    let group = app_state
        .group_service
        .update(tenant_uuid, group_uuid, payload)
        .await?;
    Ok(Single::ok(group))
}

#[utoipa::path(
    delete,
    path = "/tenant/{tenant_uuid}/group/{group_uuid}",
    tag = "Groups",
    responses(
        (status = 204, description = "Grupo removido"),
        (status = 404, description = "Não encontrado neste tenant")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("group_uuid" = String, Path, description = "ID do grupo")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_group(
    State(app_state): State<AppState>,
    Path((tenant_uuid, group_uuid)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let group_uuid = parse_path_id(&group_uuid, "group")?;
    app_state
        .group_service
        .delete(tenant_uuid, group_uuid)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
