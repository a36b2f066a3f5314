// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Tenants ---
        handlers::tenancy::create_tenant,
        handlers::tenancy::create_tenant_privileged,
        handlers::tenancy::list_tenants,
        handlers::tenancy::read_tenant,
        handlers::tenancy::update_tenant,
        handlers::tenancy::delete_tenant,
        handlers::tenancy::bind_tenant_feature_flag,
        handlers::tenancy::unbind_tenant_feature_flag,
        handlers::tenancy::list_available_roles,

        // --- Projects ---
        handlers::tenancy::create_project,
        handlers::tenancy::create_project_privileged,
        handlers::tenancy::list_projects,
        handlers::tenancy::read_project,
        handlers::tenancy::update_project,
        handlers::tenancy::delete_project,
        handlers::tenancy::bind_project_feature_flag,
        handlers::tenancy::unbind_project_feature_flag,

        // --- Users ---
        handlers::identity::create_user,
        handlers::identity::create_user_privileged,
        handlers::identity::list_users,
        handlers::identity::read_user,
        handlers::identity::update_user,
        handlers::identity::delete_user,

        // --- Service accounts ---
        handlers::identity::create_service_account,
        handlers::identity::create_service_account_privileged,
        handlers::identity::list_service_accounts,
        handlers::identity::read_service_account,
        handlers::identity::update_service_account,
        handlers::identity::delete_service_account,

        // --- Groups ---
        handlers::identity::create_group,
        handlers::identity::create_group_privileged,
        handlers::identity::list_groups,
        handlers::identity::read_group,
        handlers::identity::update_group,
        handlers::identity::delete_group,

        // --- Roles ---
        handlers::rbac::create_role,
        handlers::rbac::list_roles,
        handlers::rbac::read_role,
        handlers::rbac::update_role,
        handlers::rbac::delete_role,
        handlers::rbac::include_role,
        handlers::rbac::exclude_role,

        // --- Feature flags ---
        handlers::rbac::create_feature_flag,
        handlers::rbac::list_feature_flags,
        handlers::rbac::read_feature_flag,
        handlers::rbac::delete_feature_flag,

        // --- Role bindings ---
        handlers::rbac::create_role_binding,
        handlers::rbac::create_role_binding_privileged,
        handlers::rbac::list_role_bindings,
        handlers::rbac::read_role_binding,
        handlers::rbac::update_role_binding,
        handlers::rbac::delete_role_binding,

        // --- Multipasses ---
        handlers::credential::create_user_multipass,
        handlers::credential::list_user_multipasses,
        handlers::credential::read_user_multipass,
        handlers::credential::delete_user_multipass,
        handlers::credential::create_service_account_multipass,
        handlers::credential::list_service_account_multipasses,
        handlers::credential::read_service_account_multipass,
        handlers::credential::delete_service_account_multipass,

        // --- Passwords ---
        handlers::credential::create_password,
        handlers::credential::list_passwords,
        handlers::credential::read_password,
        handlers::credential::delete_password,
    ),
    components(
        schemas(
            // --- TENANCY ---
            models::tenancy::Tenant,
            models::tenancy::TenantFeatureFlag,
            models::tenancy::Project,
            models::tenancy::TenantPayload,
            models::tenancy::ProjectPayload,
            models::tenancy::TenantFeatureFlagPayload,
            models::tenancy::AvailableRole,
            models::tenancy::AvailableRoles,

            // --- IDENTITY ---
            models::identity::User,
            models::identity::ServiceAccount,
            models::identity::Group,
            models::identity::SubjectKind,
            models::identity::Subject,
            models::identity::SubjectsInput,
            models::identity::UserPayload,
            models::identity::ServiceAccountPayload,
            models::identity::GroupPayload,

            // --- RBAC ---
            models::rbac::RoleScope,
            models::rbac::IncludedRole,
            models::rbac::Role,
            models::rbac::FeatureFlag,
            models::rbac::BoundRole,
            models::rbac::RoleBinding,
            models::rbac::RolePayload,
            models::rbac::IncludeRolePayload,
            models::rbac::FeatureFlagPayload,
            models::rbac::RoleBindingPayload,

            // --- CREDENTIALS ---
            models::credential::OwnerType,
            models::credential::MultipassView,
            models::credential::IssuedMultipass,
            models::credential::IssuedMultipassBody,
            models::credential::PasswordView,
            models::credential::IssuedPassword,
            models::credential::MultipassPayload,
            models::credential::PasswordPayload,
        )
    ),
    tags(
        (name = "Tenants", description = "Tenants e suas feature flags (somente root)"),
        (name = "Projects", description = "Projetos dentro de um tenant"),
        (name = "Users", description = "Usuários do tenant"),
        (name = "Service Accounts", description = "Contas de serviço do tenant"),
        (name = "Groups", description = "Grupos de usuários, grupos e service accounts"),
        (name = "Roles", description = "Registro global de roles"),
        (name = "Feature Flags", description = "Registro global de feature flags"),
        (name = "Role Bindings", description = "Concessão de roles a sujeitos"),
        (name = "Multipasses", description = "Tokens de acesso de users e service accounts"),
        (name = "Passwords", description = "Senhas de service accounts")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
