// src/services/rbac_service.rs

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        identifier::{require_identifier, IdentifierPolicy},
        ids::{new_resource_version, valid_till},
    },
    db::{ensure_version, ChangeSet, IamState, IamStore, ObjectKey, Scoped},
    models::rbac::{
        BoundRole, FeatureFlag, FeatureFlagPayload, IncludeRolePayload, IncludedRole, Role,
        RoleBinding, RoleBindingPayload, RolePayload,
    },
    services::{identity_service::check_subjects, tenancy_service::pick_uuid},
};

// ---
// Roles (registro global)
// ---
#[derive(Clone)]
pub struct RoleService {
    store: IamStore,
    policy: IdentifierPolicy,
}

impl RoleService {
    pub fn new(store: IamStore, policy: IdentifierPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn create(&self, payload: RolePayload) -> Result<Role, AppError> {
        let policy = self.policy;
        let role = self
            .store
            .write(move |state| {
                let name = require_identifier(payload.name.as_ref(), policy, "name")?;
                if state.roles.contains_key(&name) {
                    return Err(AppError::AlreadyExists(format!("role '{}'", name)));
                }

                let role = Role {
                    name,
                    description: payload.description.unwrap_or_default(),
                    scope: payload.scope.unwrap_or_default(),
                    options_schema: payload.options_schema.unwrap_or_default(),
                    require_one_of_feature_flags: payload
                        .require_one_of_feature_flags
                        .unwrap_or_default(),
                    included_roles: Vec::new(),
                };
                let mut changes = ChangeSet::new();
                changes.put(role.clone());
                Ok((role, changes))
            })
            .await?;

        tracing::info!("🔑 Role '{}' criada", role.name);
        Ok(role)
    }

    pub async fn read(&self, name: &str) -> Result<Role, AppError> {
        self.store
            .read(|state| state.roles.get(name).cloned().ok_or(AppError::NotFound("role")))
            .await
    }

    pub async fn list(&self) -> Vec<Role> {
        self.store
            .read(|state| state.roles.values().cloned().collect())
            .await
    }

    /// O nome é a chave e não muda. O escopo só muda se vier no corpo.
    pub async fn update(&self, name: &str, payload: RolePayload) -> Result<Role, AppError> {
        self.store
            .write(move |state| {
                let current = state.roles.get(name).ok_or(AppError::NotFound("role"))?;

                let mut updated = current.clone();
                updated.description = payload.description.unwrap_or_default();
                updated.scope = payload.scope.unwrap_or(current.scope);
                updated.options_schema = payload.options_schema.unwrap_or_default();
                updated.require_one_of_feature_flags =
                    payload.require_one_of_feature_flags.unwrap_or_default();

                let mut changes = ChangeSet::new();
                changes.put(updated.clone());
                Ok((updated, changes))
            })
            .await
    }

    pub async fn delete(&self, name: &str) -> Result<(), AppError> {
        self.store
            .write(|state| {
                if !state.roles.contains_key(name) {
                    return Err(AppError::NotFound("role"));
                }
                ensure_role_unused(state, name)?;
                let mut changes = ChangeSet::new();
                changes.delete(ObjectKey::Role(name.to_string()));
                Ok(((), changes))
            })
            .await
    }

    pub async fn include(
        &self,
        name: &str,
        included_name: &str,
        payload: IncludeRolePayload,
    ) -> Result<Role, AppError> {
        self.store
            .write(move |state| {
                let current = state.roles.get(name).ok_or(AppError::NotFound("role"))?;
                if !state.roles.contains_key(included_name) {
                    return Err(AppError::NotFound("role"));
                }
                if name == included_name {
                    return Err(AppError::BadRequest(
                        "Uma role não pode incluir a si mesma.".into(),
                    ));
                }

                let options_template = payload.options_template.unwrap_or_default();
                let mut updated = current.clone();
                match updated.included_roles.iter_mut().find(|r| r.name == included_name) {
                    Some(existing) => existing.options_template = options_template,
                    None => updated.included_roles.push(IncludedRole {
                        name: included_name.to_string(),
                        options_template,
                    }),
                }

                let mut changes = ChangeSet::new();
                changes.put(updated.clone());
                Ok((updated, changes))
            })
            .await
    }

    pub async fn exclude(&self, name: &str, included_name: &str) -> Result<Role, AppError> {
        self.store
            .write(|state| {
                let current = state.roles.get(name).ok_or(AppError::NotFound("role"))?;
                if !current.included_roles.iter().any(|r| r.name == included_name) {
                    return Err(AppError::NotFound("included role"));
                }

                let mut updated = current.clone();
                updated.included_roles.retain(|r| r.name != included_name);
                let mut changes = ChangeSet::new();
                changes.put(updated.clone());
                Ok((updated, changes))
            })
            .await
    }
}

fn ensure_role_unused(state: &IamState, name: &str) -> Result<(), AppError> {
    if state
        .role_bindings
        .values()
        .any(|rb| rb.roles.iter().any(|r| r.name == name))
    {
        return Err(AppError::InUse(format!(
            "A role '{}' ainda é usada por role bindings.",
            name
        )));
    }
    if state
        .roles
        .values()
        .any(|role| role.included_roles.iter().any(|r| r.name == name))
    {
        return Err(AppError::InUse(format!(
            "A role '{}' ainda é incluída por outra role.",
            name
        )));
    }
    Ok(())
}

// ---
// Feature flags (registro global)
// ---
#[derive(Clone)]
pub struct FeatureFlagService {
    store: IamStore,
    policy: IdentifierPolicy,
}

impl FeatureFlagService {
    pub fn new(store: IamStore, policy: IdentifierPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn create(&self, payload: FeatureFlagPayload) -> Result<FeatureFlag, AppError> {
        let policy = self.policy;
        self.store
            .write(move |state| {
                let name = require_identifier(payload.name.as_ref(), policy, "name")?;
                if state.feature_flags.contains_key(&name) {
                    return Err(AppError::AlreadyExists(format!("feature flag '{}'", name)));
                }
                let flag = FeatureFlag { name };
                let mut changes = ChangeSet::new();
                changes.put(flag.clone());
                Ok((flag, changes))
            })
            .await
    }

    pub async fn read(&self, name: &str) -> Result<FeatureFlag, AppError> {
        self.store
            .read(|state| {
                state
                    .feature_flags
                    .get(name)
                    .cloned()
                    .ok_or(AppError::NotFound("feature_flag"))
            })
            .await
    }

    pub async fn list(&self) -> Vec<FeatureFlag> {
        self.store
            .read(|state| state.feature_flags.values().cloned().collect())
            .await
    }

    /// Também desliga a flag em todos os tenants e projetos.
    pub async fn delete(&self, name: &str) -> Result<(), AppError> {
        self.store
            .write(|state| {
                if !state.feature_flags.contains_key(name) {
                    return Err(AppError::NotFound("feature_flag"));
                }
                let mut changes = ChangeSet::new();
                for tenant in state.tenants.values() {
                    if tenant.feature_flags.iter().any(|ff| ff.name == name) {
                        let mut updated = tenant.clone();
                        updated.feature_flags.retain(|ff| ff.name != name);
                        updated.resource_version = new_resource_version();
                        changes.put(updated);
                    }
                }
                for project in state.projects.values() {
                    if project.feature_flags.iter().any(|ff| ff == name) {
                        let mut updated = project.clone();
                        updated.feature_flags.retain(|ff| ff != name);
                        updated.resource_version = new_resource_version();
                        changes.put(updated);
                    }
                }
                changes.delete(ObjectKey::FeatureFlag(name.to_string()));
                Ok(((), changes))
            })
            .await
    }
}

// ---
// Role bindings (dentro de um tenant)
// ---
#[derive(Clone)]
pub struct RoleBindingService {
    store: IamStore,
}

fn check_bound_roles(state: &IamState, roles: &[BoundRole]) -> Result<(), AppError> {
    for role in roles {
        if !state.roles.contains_key(&role.name) {
            return Err(AppError::BadRequest(format!(
                "Role '{}' não existe.",
                role.name
            )));
        }
    }
    Ok(())
}

impl RoleBindingService {
    pub fn new(store: IamStore) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        tenant_uuid: Uuid,
        payload: RoleBindingPayload,
        privileged: bool,
    ) -> Result<RoleBinding, AppError> {
        let binding = self
            .store
            .write(move |state| {
                state.tenant(tenant_uuid)?;
                payload.validate()?;
                let uuid = pick_uuid(privileged, payload.uuid, |id| {
                    state.role_bindings.contains_key(&id)
                })?;
                let subjects = payload.members.collect();
                check_subjects(state, tenant_uuid, &subjects)?;
                let roles = payload.roles.unwrap_or_default();
                check_bound_roles(state, &roles)?;

                let ttl = payload.ttl.unwrap_or_default();
                let binding = RoleBinding {
                    uuid,
                    tenant_uuid,
                    subjects,
                    roles,
                    ttl,
                    valid_till: valid_till(ttl)?,
                    require_mfa: payload.require_mfa.unwrap_or(false),
                    resource_version: new_resource_version(),
                };
                let mut changes = ChangeSet::new();
                changes.put(binding.clone());
                Ok((binding, changes))
            })
            .await?;

        tracing::debug!("Role binding {} criada no tenant {}", binding.uuid, tenant_uuid);
        Ok(binding)
    }

    pub async fn read(&self, tenant_uuid: Uuid, rb_uuid: Uuid) -> Result<RoleBinding, AppError> {
        self.store
            .read(|state| state.scoped::<RoleBinding>(tenant_uuid, rb_uuid).cloned())
            .await
    }

    pub async fn list(&self, tenant_uuid: Uuid) -> Result<Vec<RoleBinding>, AppError> {
        self.store
            .read(|state| -> Result<_, AppError> {
                state.tenant(tenant_uuid)?;
                Ok(state.scoped_list::<RoleBinding>(tenant_uuid))
            })
            .await
    }

    /// `valid_till` é recalculado a partir do momento da atualização.
    pub async fn update(
        &self,
        tenant_uuid: Uuid,
        rb_uuid: Uuid,
        payload: RoleBindingPayload,
    ) -> Result<RoleBinding, AppError> {
        self.store
            .write(move |state| {
                let current = state.scoped::<RoleBinding>(tenant_uuid, rb_uuid)?;
                ensure_version(&current.resource_version, payload.resource_version.as_deref())?;
                payload.validate()?;
                let subjects = payload.members.collect();
                check_subjects(state, tenant_uuid, &subjects)?;
                let roles = payload.roles.unwrap_or_default();
                check_bound_roles(state, &roles)?;

                let ttl = payload.ttl.unwrap_or_default();
                let mut updated = current.clone();
                updated.subjects = subjects;
                updated.roles = roles;
                updated.ttl = ttl;
                updated.valid_till = valid_till(ttl)?;
                updated.require_mfa = payload.require_mfa.unwrap_or(false);
                updated.resource_version = new_resource_version();

                let mut changes = ChangeSet::new();
                changes.put(updated.clone());
                Ok((updated, changes))
            })
            .await
    }

    pub async fn delete(&self, tenant_uuid: Uuid, rb_uuid: Uuid) -> Result<(), AppError> {
        self.store
            .write(|state| {
                state.scoped::<RoleBinding>(tenant_uuid, rb_uuid)?;
                let mut changes = ChangeSet::new();
                changes.delete(RoleBinding::key(rb_uuid));
                Ok(((), changes))
            })
            .await
    }
}
