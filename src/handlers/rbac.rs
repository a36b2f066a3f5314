// src/handlers/rbac.rs

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    common::{
        error::AppError,
        ids::parse_path_id,
        payload::{optional_body, Payload},
        response::{Listing, Single},
    },
    config::AppState,
    middleware::rbac::RequireRoot,
    models::rbac::{
        FeatureFlag, FeatureFlagPayload, IncludeRolePayload, Role, RoleBinding,
        RoleBindingPayload, RolePayload,
    },
};

// ---
// Roles (registro global, leitura livre, escrita só root)
// ---
#[utoipa::path(
    post,
    path = "/role",
    tag = "Roles",
    request_body = RolePayload,
    responses(
        (status = 201, description = "Role criada", body = Role),
        (status = 400, description = "Nome ausente ou já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_role(
    State(app_state): State<AppState>,
    _root: RequireRoot,
    Payload(payload): Payload<RolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let role = app_state.role_service.create(payload).await?;
    Ok(Single::created(role))
}

#[utoipa::path(
    get,
    path = "/role",
    tag = "Roles",
    responses((status = 200, description = "Todas as roles", body = [Role])),
    security(("api_jwt" = []))
)]
pub async fn list_roles(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Listing(app_state.role_service.list().await))
}

#[utoipa::path(
    get,
    path = "/role/{role_name}",
    tag = "Roles",
    responses(
        (status = 200, description = "Role", body = Role),
        (status = 404, description = "Role não encontrada")
    ),
    params(("role_name" = String, Path, description = "Nome da role")),
    security(("api_jwt" = []))
)]
pub async fn read_role(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let role = app_state.role_service.read(&name).await?;
    Ok(Single::ok(role))
}

#[utoipa::path(
    put,
    path = "/role/{role_name}",
    tag = "Roles",
    request_body = RolePayload,
    responses(
        (status = 200, description = "Role atualizada", body = Role),
        (status = 404, description = "Role não encontrada")
    ),
    params(("role_name" = String, Path, description = "Nome da role")),
    security(("api_jwt" = []))
)]
pub async fn update_role(
    State(app_state): State<AppState>,
    _root: RequireRoot,
    Path(name): Path<String>,
    Payload(payload): Payload<RolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let role = app_state.role_service.update(&name, payload).await?;
    Ok(Single::ok(role))
}

#[utoipa::path(
    delete,
    path = "/role/{role_name}",
    tag = "Roles",
    responses(
        (status = 204, description = "Role removida"),
        (status = 404, description = "Role não encontrada"),
        (status = 409, description = "Role ainda em uso")
    ),
    params(("role_name" = String, Path, description = "Nome da role")),
    security(("api_jwt" = []))
)]
pub async fn delete_role(
    State(app_state): State<AppState>,
    _root: RequireRoot,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.role_service.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/role/{role_name}/include/{included_name}",
    tag = "Roles",
    request_body = IncludeRolePayload,
    responses(
        (status = 200, description = "Role incluída", body = Role),
        (status = 400, description = "Role incluindo a si mesma"),
        (status = 404, description = "Alguma das roles não existe")
    ),
    params(
        ("role_name" = String, Path, description = "Role que inclui"),
        ("included_name" = String, Path, description = "Role incluída")
    ),
    security(("api_jwt" = []))
)]
pub async fn include_role(
    State(app_state): State<AppState>,
    _root: RequireRoot,
    Path((name, included_name)): Path<(String, String)>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload: IncludeRolePayload = optional_body(&body)?;
    let role = app_state
        .role_service
        .include(&name, &included_name, payload)
        .await?;
    Ok(Single::ok(role))
}

#[utoipa::path(
    delete,
    path = "/role/{role_name}/include/{included_name}",
    tag = "Roles",
    responses(
        (status = 200, description = "Inclusão desfeita", body = Role),
        (status = 404, description = "Role ou inclusão não encontrada")
    ),
    params(
        ("role_name" = String, Path, description = "Role que inclui"),
        ("included_name" = String, Path, description = "Role incluída")
    ),
    security(("api_jwt" = []))
)]
pub async fn exclude_role(
    State(app_state): State<AppState>,
    _root: RequireRoot,
    Path((name, included_name)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let role = app_state
        .role_service
        .exclude(&name, &included_name)
        .await?;
    Ok(Single::ok(role))
}

// ---
// Feature flags
// ---
#[utoipa::path(
    post,
    path = "/feature_flag",
    tag = "Feature Flags",
    request_body = FeatureFlagPayload,
    responses(
        (status = 201, description = "Feature flag criada", body = FeatureFlag),
        (status = 400, description = "Nome ausente ou já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_feature_flag(
    State(app_state): State<AppState>,
    _root: RequireRoot,
    Payload(payload): Payload<FeatureFlagPayload>,
) -> Result<impl IntoResponse, AppError> {
    let feature_flag = app_state.feature_flag_service.create(payload).await?;
    Ok(Single::created(feature_flag))
}

#[utoipa::path(
    get,
    path = "/feature_flag",
    tag = "Feature Flags",
    responses((status = 200, description = "Todas as feature flags", body = [FeatureFlag])),
    security(("api_jwt" = []))
)]
pub async fn list_feature_flags(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Listing(app_state.feature_flag_service.list().await))
}

#[utoipa::path(
    get,
    path = "/feature_flag/{feature_flag_name}",
    tag = "Feature Flags",
    responses(
        (status = 200, description = "Feature flag", body = FeatureFlag),
        (status = 404, description = "Feature flag não encontrada")
    ),
    params(("feature_flag_name" = String, Path, description = "Nome da feature flag")),
    security(("api_jwt" = []))
)]
pub async fn read_feature_flag(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let feature_flag = app_state.feature_flag_service.read(&name).await?;
    Ok(Single::ok(feature_flag))
}

#[utoipa::path(
    delete,
    path = "/feature_flag/{feature_flag_name}",
    tag = "Feature Flags",
    responses(
        (status = 204, description = "Feature flag removida e desligada em todo lugar"),
        (status = 404, description = "Feature flag não encontrada")
    ),
    params(("feature_flag_name" = String, Path, description = "Nome da feature flag")),
    security(("api_jwt" = []))
)]
pub async fn delete_feature_flag(
    State(app_state): State<AppState>,
    _root: RequireRoot,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.feature_flag_service.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Role bindings
// ---
#[utoipa::path(
    post,
    path = "/tenant/{tenant_uuid}/role_binding",
    tag = "Role Bindings",
    request_body = RoleBindingPayload,
    responses(
        (status = 201, description = "Role binding criado", body = RoleBinding),
        (status = 400, description = "Sujeito ou role inexistente, ttl ausente")
    ),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn create_role_binding(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
    Payload(payload): Payload<RoleBindingPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let binding = app_state
        .role_binding_service
        .create(tenant_uuid, payload, false)
        .await?;
    Ok(Single::created(binding))
}

#[utoipa::path(
    post,
    path = "/tenant/{tenant_uuid}/role_binding/privileged",
    tag = "Role Bindings",
    request_body = RoleBindingPayload,
    responses((status = 201, description = "Role binding criado com o uuid informado", body = RoleBinding)),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn create_role_binding_privileged(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
    Payload(payload): Payload<RoleBindingPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let binding = app_state
        .role_binding_service
        .create(tenant_uuid, payload, true)
        .await?;
    Ok(Single::created(binding))
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/role_binding",
    tag = "Role Bindings",
    responses((status = 200, description = "Role bindings do tenant", body = [RoleBinding])),
    params(("tenant_uuid" = String, Path, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn list_role_bindings(
    State(app_state): State<AppState>,
    Path(tenant_uuid): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    Ok(Listing(
        app_state.role_binding_service.list(tenant_uuid).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/tenant/{tenant_uuid}/role_binding/{role_binding_uuid}",
    tag = "Role Bindings",
    responses(
        (status = 200, description = "Role binding", body = RoleBinding),
        (status = 404, description = "Não encontrado neste tenant")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("role_binding_uuid" = String, Path, description = "ID do role binding")
    ),
    security(("api_jwt" = []))
)]
pub async fn read_role_binding(
    State(app_state): State<AppState>,
    Path((tenant_uuid, rb_uuid)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let rb_uuid = parse_path_id(&rb_uuid, "role binding")?;
    let binding = app_state
        .role_binding_service
        .read(tenant_uuid, rb_uuid)
        .await?;
    Ok(Single::ok(binding))
}

#[utoipa::path(
    put,
    path = "/tenant/{tenant_uuid}/role_binding/{role_binding_uuid}",
    tag = "Role Bindings",
    request_body = RoleBindingPayload,
    responses(
        (status = 200, description = "Role binding atualizado", body = RoleBinding),
        (status = 404, description = "Não encontrado neste tenant"),
        (status = 409, description = "resource_version desatualizada")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("role_binding_uuid" = String, Path, description = "ID do role binding")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_role_binding(
    State(app_state): State<AppState>,
    Path((tenant_uuid, rb_uuid)): Path<(String, String)>,
    Payload(payload): Payload<RoleBindingPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let rb_uuid = parse_path_id(&rb_uuid, "role binding")?;
    let binding = app_state
        .role_binding_service
        .update(tenant_uuid, rb_uuid, payload)
        .await?;
    Ok(Single::ok(binding))
}

#[utoipa::path(
    delete,
    path = "/tenant/{tenant_uuid}/role_binding/{role_binding_uuid}",
    tag = "Role Bindings",
    responses(
        (status = 204, description = "Role binding removido"),
        (status = 404, description = "Não encontrado neste tenant")
    ),
    params(
        ("tenant_uuid" = String, Path, description = "ID do tenant"),
        ("role_binding_uuid" = String, Path, description = "ID do role binding")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_role_binding(
    State(app_state): State<AppState>,
    Path((tenant_uuid, rb_uuid)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_uuid = parse_path_id(&tenant_uuid, "tenant")?;
    let rb_uuid = parse_path_id(&rb_uuid, "role binding")?;
    app_state
        .role_binding_service
        .delete(tenant_uuid, rb_uuid)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
