// src/handlers/tenancy.rs

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{
        error::AppError,
        ids::parse_path_id,
        payload::{optional_body, Payload},
        response::{Envelope, Listing, Single},
    },
    config::AppState,
    middleware::rbac::RequireRoot,
    models::tenancy::{
        AvailableRoles, Project, ProjectPayload, Tenant, TenantFeatureFlagPayload, TenantPayload,
    },
};

// ---
// Tenants (somente root, exceto a leitura do próprio tenant)
// ---
#[utoipa::path(
    post,
    path = "/tenant",
    tag = "Tenants",
    request_body = TenantPayload,
    responses(
        (status = 201, description = "Tenant criado", body = Tenant),
        (status = 400, description = "Payload inválido ou token ausente"),
        (status = 403, description = "Token sem privilégio")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tenant(
    State(app_state): State<AppState>,
    _root: RequireRoot,
    Payload(payload): Payload<TenantPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant = app_state.tenant_service.create(payload, false).await?;
    Ok(Single::created(tenant))
}

#[utoipa::path(
    post,
    path = "/tenant/privileged",
    tag = "Tenants",
    request_body = TenantPayload,
    responses(
        (status = 201, description = "Tenant criado com o uuid informado", body = Tenant),
        (status = 400, description = "uuid ausente ou já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tenant_privileged(
    State(app_state): State<AppState>,
    _root: RequireRoot,
    Payload(payload): Payload<TenantPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant = app_state.tenant_service.create(payload, true).await?;
    Ok(Single::created(tenant))
}

#[utoipa::path(
    get,
    path = "/tenant",
    tag = "Tenants",
    responses((status = 200, description = "Lista de tenants", body = [Tenant])),
    security(("api_jwt" = []))
)]
pub async fn list_tenants(
    State(app_state): State<AppState>,
    _root: RequireRoot,
) -> Result<impl IntoResponse, AppError> {
    Ok(Listing(app_state.tenant_service.list().await))
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}",
    tag = "Tenants",
    responses(
        (status = 200, description = "Tenant", body = Tenant),
        (status = 404, description = "Tenant não encontrado")
    ),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn read_tenant(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let tenant = app_state.tenant_service.read(tenant_uuid).await?;
    Ok(Single::ok(tenant))
}

#[utoipa::path(
    put,
    path = "/tenant/{tenant_uuid}",
    tag = "Tenants",
    request_body = TenantPayload,
    responses(
        (status = 200, description = "Tenant atualizado", body = Tenant),
        (status = 404, description = "Tenant não encontrado"),
        (status = 409, description = "resource_version desatualizada")
    ),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn update_tenant(
    State(app_state): State<AppState>,
    _root: RequireRoot,
    Path(tenant_uuid): Path<String>,
    Payload(payload): Payload<TenantPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let tenant = app_state.tenant_service.update(tenant_uuid, payload).await?;
    Ok(Single::ok(tenant))
}

#[utoipa::path(
    delete,
    path = "/tenant/{tenant_uuid}",
    tag = "Tenants",
    responses(
        (status = 204, description = "Tenant e dependentes removidos"),
        (status = 404, description = "Tenant não encontrado")
    ),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn delete_tenant(
    State(app_state): State<AppState>,
    _root: RequireRoot,
    Path(tenant_uuid): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    app_state.tenant_service.delete(tenant_uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/tenant/{tenant_uuid}/feature_flag/{feature_flag_name}",
    tag = "Tenants",
    request_body = TenantFeatureFlagPayload,
    responses(
        (status = 200, description = "Flag ligada no tenant", body = Tenant),
        (status = 404, description = "Tenant ou flag não encontrados")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("feature_flag_name" = String, Path, description = "Nome da feature flag")
    ),
    security(("api_jwt" = []))
)]
pub async fn bind_tenant_feature_flag(
    State(app_state): State<AppState>,
    _root: RequireRoot,
    Path((tenant_uuid, name)): Path<(String, String)>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let payload: TenantFeatureFlagPayload = optional_body(&body)?;
    let tenant = app_state
        .tenant_service
        .bind_feature_flag(tenant_uuid, &name, payload.enabled_for_new_projects)
        .await?;
    Ok(Single::ok(tenant))
}

#[utoipa::path(
    delete,
    path = "/tenant/{tenant_uuid}/feature_flag/{feature_flag_name}",
    tag = "Tenants",
    responses(
        (status = 200, description = "Flag desligada do tenant", body = Tenant),
        (status = 404, description = "Tenant ou flag não encontrados")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("feature_flag_name" = String, Path, description = "Nome da feature flag")
    ),
    security(("api_jwt" = []))
)]
pub async fn unbind_tenant_feature_flag(
    State(app_state): State<AppState>,
    _root: RequireRoot,
    Path((tenant_uuid, name)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let tenant = app_state
        .tenant_service
        .unbind_feature_flag(tenant_uuid, &name)
        .await?;
    Ok(Single::ok(tenant))
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/available_roles",
    tag = "Tenants",
    responses((status = 200, description = "Roles liberadas pelas flags do tenant", body = AvailableRoles)),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn list_available_roles(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let available_roles = app_state.tenant_service.available_roles(tenant_uuid).await?;
    Ok(Json(Envelope {
        data: AvailableRoles { available_roles },
    }))
}

// ---
// Projects
// ---
#[utoipa::path(
    post,
    path = "/tenant/{tenant_uuid}/project",
    tag = "Projects",
    request_body = ProjectPayload,
    responses(
        (status = 201, description = "Projeto criado", body = Project),
        (status = 400, description = "Payload inválido"),
        (status = 404, description = "Tenant não encontrado")
    ),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
    Payload(payload): Payload<ProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let project = app_state
        .project_service
        .create(tenant_uuid, payload, false)
        .await?;
    Ok(Single::created(project))
}

#[utoipa::path(
    post,
    path = "/tenant/{tenant_uuid}/project/privileged",
    tag = "Projects",
    request_body = ProjectPayload,
    responses((status = 201, description = "Projeto criado com o uuid informado", body = Project)),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn create_project_privileged(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
    Payload(payload): Payload<ProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let project = app_state
        .project_service
        .create(tenant_uuid, payload, true)
        .await?;
    Ok(Single::created(project))
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/project",
    tag = "Projects",
    responses((status = 200, description = "Projetos do tenant", body = [Project])),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn list_projects(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    Ok(Listing(app_state.project_service.list(tenant_uuid).await?))
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/project/{project_uuid}",
    tag = "Projects",
    responses(
        (status = 200, description = "Projeto", body = Project),
        (status = 404, description = "Não encontrado neste tenant")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("project_uuid" = String, Path, description = "ID do projeto")
    ),
    security(("api_jwt" = []))
)]
pub async fn read_project(
    State(app_state): State<AppState>,
    Path((tenant_uuid, project_uuid)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let project_uuid = parse_path_id(&project_uuid, "project")?;
    let project = app_state
        .project_service
        .read(tenant_uuid, project_uuid)
        .await?;
    Ok(Single::ok(project))
}

#[utoipa::path(
    put,
    path = "/tenant/{tenant_uuid}/project/{project_uuid}",
    tag = "Projects",
    request_body = ProjectPayload,
    responses(
        (status = 200, description = "Projeto atualizado", body = Project),
        (status = 404, description = "Não encontrado neste tenant"),
        (status = 409, description = "resource_version desatualizada")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("project_uuid" = String, Path, description = "ID do projeto")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_project(
    State(app_state): State<AppState>,
    Path((tenant_uuid, project_uuid)): Path<(String, String)>,
    Payload(payload): Payload<ProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let project_uuid = parse_path_id(&project_uuid, "project")?;
    let project = app_state
        .project_service
        .update(tenant_uuid, project_uuid, payload)
        .await?;
    Ok(Single::ok(project))
}

#[utoipa::path(
    delete,
    path = "/tenant/{tenant_uuid}/project/{project_uuid}",
    tag = "Projects",
    responses(
        (status = 204, description = "Projeto removido"),
        (status = 404, description = "Não encontrado neste tenant")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("project_uuid" = String, Path, description = "ID do projeto")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_project(
    State(app_state): State<AppState>,
    Path((tenant_uuid, project_uuid)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let project_uuid = parse_path_id(&project_uuid, "project")?;
    app_state
        .project_service
        .delete(tenant_uuid, project_uuid)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/tenant/{tenant_uuid}/project/{project_uuid}/feature_flag/{feature_flag_name}",
    tag = "Projects",
    responses((status = 200, description = "Flag ligada no projeto", body = Project)),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("project_uuid" = String, Path, description = "ID do projeto"),
        ("feature_flag_name" = String, Path, description = "Nome da feature flag")
    ),
    security(("api_jwt" = []))
)]
pub async fn bind_project_feature_flag(
    State(app_state): State<AppState>,
    Path((tenant_uuid, project_uuid, name)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let project_uuid = parse_path_id(&project_uuid, "project")?;
    let project = app_state
        .project_service
        .bind_feature_flag(tenant_uuid, project_uuid, &name)
        .await?;
    Ok(Single::ok(project))
}

#[utoipa::path(
    delete,
    path = "/tenant/{tenant_uuid}/project/{project_uuid}/feature_flag/{feature_flag_name}",
    tag = "Projects",
    responses((status = 200, description = "Flag desligada do projeto", body = Project)),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("project_uuid" = String, Path, description = "ID do projeto"),
        ("feature_flag_name" = String, Path, description = "Nome da feature flag")
    ),
    security(("api_jwt" = []))
)]
pub async fn unbind_project_feature_flag(
    State(app_state): State<AppState>,
    Path((tenant_uuid, project_uuid, name)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let project_uuid = parse_path_id(&project_uuid, "project")?;
    let project = app_state
        .project_service
        .unbind_feature_flag(tenant_uuid, project_uuid, &name)
        .await?;
    Ok(Single::ok(project))
}
