// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::{auth::auth_guard, tenancy::tenant_guard},
};

// Tudo que vive debaixo de /tenant. O guardião de tenant roda por rota (precisa do {tenant_uuid}).
fn tenant_routes() -> Router<AppState> {
    use handlers::{credential, identity, rbac, tenancy};

    Router::new()
        // Tenants
        .route(
            "/tenant",
            post(tenancy::create_tenant).get(tenancy::list_tenants),
        )
        .route("/tenant/privileged", post(tenancy::create_tenant_privileged))
        .route(
            "/tenant/{tenant_uuid}",
            get(tenancy::read_tenant)
                .post(tenancy::update_tenant)
                .put(tenancy::update_tenant)
                .delete(tenancy::delete_tenant),
        )
        .route(
            "/tenant/{tenant_uuid}/feature_flag/{feature_flag_name}",
            post(tenancy::bind_tenant_feature_flag).delete(tenancy::unbind_tenant_feature_flag),
        )
        .route(
            "/tenant/{tenant_uuid}/available_roles",
            get(tenancy::list_available_roles),
        )
        // Projects
        .route(
            "/tenant/{tenant_uuid}/project",
            post(tenancy::create_project).get(tenancy::list_projects),
        )
        .route(
            "/tenant/{tenant_uuid}/project/privileged",
            post(tenancy::create_project_privileged),
        )
        .route(
            "/tenant/{tenant_uuid}/project/{project_uuid}",
            get(tenancy::read_project)
                .post(tenancy::update_project)
                .put(tenancy::update_project)
                .delete(tenancy::delete_project),
        )
        .route(
            "/tenant/{tenant_uuid}/project/{project_uuid}/feature_flag/{feature_flag_name}",
            post(tenancy::bind_project_feature_flag).delete(tenancy::unbind_project_feature_flag),
        )
        // Users
        .route(
            "/tenant/{tenant_uuid}/user",
            post(identity::create_user).get(identity::list_users),
        )
        .route(
            "/tenant/{tenant_uuid}/user/privileged",
            post(identity::create_user_privileged),
        )
        .route(
            "/tenant/{tenant_uuid}/user/{user_uuid}",
            get(identity::read_user)
                .post(identity::update_user)
                .put(identity::update_user)
                .delete(identity::delete_user),
        )
        .route(
            "/tenant/{tenant_uuid}/user/{user_uuid}/multipass",
            post(credential::create_user_multipass).get(credential::list_user_multipasses),
        )
        .route(
            "/tenant/{tenant_uuid}/user/{user_uuid}/multipass/{multipass_uuid}",
            get(credential::read_user_multipass)
                .delete(credential::delete_user_multipass)
                .post(credential::credential_update_not_allowed)
                .put(credential::credential_update_not_allowed),
        )
        // Service accounts
        .route(
            "/tenant/{tenant_uuid}/service_account",
            post(identity::create_service_account).get(identity::list_service_accounts),
        )
        .route(
            "/tenant/{tenant_uuid}/service_account/privileged",
            post(identity::create_service_account_privileged),
        )
        .route(
            "/tenant/{tenant_uuid}/service_account/{service_account_uuid}",
            get(identity::read_service_account)
                .post(identity::update_service_account)
                .put(identity::update_service_account)
                .delete(identity::delete_service_account),
        )
        .route(
            "/tenant/{tenant_uuid}/service_account/{service_account_uuid}/multipass",
            post(credential::create_service_account_multipass)
                .get(credential::list_service_account_multipasses),
        )
        .route(
            "/tenant/{tenant_uuid}/service_account/{service_account_uuid}/multipass/{multipass_uuid}",
            get(credential::read_service_account_multipass)
                .delete(credential::delete_service_account_multipass)
                .post(credential::credential_update_not_allowed)
                .put(credential::credential_update_not_allowed),
        )
        .route(
            "/tenant/{tenant_uuid}/service_account/{service_account_uuid}/password",
            post(credential::create_password).get(credential::list_passwords),
        )
        .route(
            "/tenant/{tenant_uuid}/service_account/{service_account_uuid}/password/{password_uuid}",
            get(credential::read_password)
                .delete(credential::delete_password)
                .post(credential::credential_update_not_allowed)
                .put(credential::credential_update_not_allowed),
        )
        // Groups
        .route(
            "/tenant/{tenant_uuid}/group",
            post(identity::create_group).get(identity::list_groups),
        )
        .route(
            "/tenant/{tenant_uuid}/group/privileged",
            post(identity::create_group_privileged),
        )
        .route(
            "/tenant/{tenant_uuid}/group/{group_uuid}",
            get(identity::read_group)
                .post(identity::update_group)
                .put(identity::update_group)
                .delete(identity::delete_group),
        )
        // Role bindings
        .route(
            "/tenant/{tenant_uuid}/role_binding",
            post(rbac::create_role_binding).get(rbac::list_role_bindings),
        )
        .route(
            "/tenant/{tenant_uuid}/role_binding/privileged",
            post(rbac::create_role_binding_privileged),
        )
        .route(
            "/tenant/{tenant_uuid}/role_binding/{role_binding_uuid}",
            get(rbac::read_role_binding)
                .post(rbac::update_role_binding)
                .put(rbac::update_role_binding)
                .delete(rbac::delete_role_binding),
        )
        .route_layer(axum_middleware::from_fn(tenant_guard))
}

// Registros globais: leitura para qualquer token válido, escrita só root (checado no handler).
fn registry_routes() -> Router<AppState> {
    use handlers::rbac;

    Router::new()
        .route("/role", post(rbac::create_role).get(rbac::list_roles))
        .route(
            "/role/{role_name}",
            get(rbac::read_role)
                .post(rbac::update_role)
                .put(rbac::update_role)
                .delete(rbac::delete_role),
        )
        .route(
            "/role/{role_name}/include/{included_name}",
            post(rbac::include_role).delete(rbac::exclude_role),
        )
        .route(
            "/feature_flag",
            post(rbac::create_feature_flag).get(rbac::list_feature_flags),
        )
        .route(
            "/feature_flag/{feature_flag_name}",
            get(rbac::read_feature_flag).delete(rbac::delete_feature_flag),
        )
}

/// Monta o router completo. Usado pelo `main` e pelos testes.
pub fn app(app_state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(tenant_routes())
        .merge(registry_routes())
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
