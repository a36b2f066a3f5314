// src/services/tenancy_service.rs

use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        identifier::{require_identifier, IdentifierPolicy},
        ids::{new_resource_version, new_uuid},
    },
    db::{ensure_version, ChangeSet, IamState, IamStore, ObjectKey},
    models::{
        identity::SubjectKind,
        tenancy::{
            AvailableRole, Project, ProjectPayload, Tenant, TenantFeatureFlag, TenantPayload,
        },
    },
    services::identity_service::full_identifier,
};

#[derive(Clone)]
pub struct TenantService {
    store: IamStore,
    policy: IdentifierPolicy,
}

impl TenantService {
    pub fn new(store: IamStore, policy: IdentifierPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn create(&self, payload: TenantPayload, privileged: bool) -> Result<Tenant, AppError> {
        let policy = self.policy;
        let tenant = self
            .store
            .write(move |state| {
                let uuid = pick_uuid(privileged, payload.uuid, |id| {
                    state.tenants.contains_key(&id)
                })?;
                let identifier = require_identifier(payload.identifier.as_ref(), policy, "identifier")?;
                ensure_unique_tenant_identifier(state, &identifier, None)?;

                let tenant = Tenant {
                    uuid,
                    identifier,
                    resource_version: new_resource_version(),
                    feature_flags: Vec::new(),
                };
                let mut changes = ChangeSet::new();
                changes.put(tenant.clone());
                Ok((tenant, changes))
            })
            .await?;

        tracing::info!("🏢 Tenant criado: {} ({})", tenant.identifier, tenant.uuid);
        Ok(tenant)
    }

    pub async fn read(&self, tenant_uuid: Uuid) -> Result<Tenant, AppError> {
        self.store
            .read(|state| state.tenant(tenant_uuid).cloned())
            .await
    }

    pub async fn list(&self) -> Vec<Tenant> {
        self.store
            .read(|state| state.tenants.values().cloned().collect())
            .await
    }

    pub async fn update(&self, tenant_uuid: Uuid, payload: TenantPayload) -> Result<Tenant, AppError> {
        let policy = self.policy;
        self.store
            .write(move |state| {
                let current = state.tenant(tenant_uuid)?;
                ensure_version(&current.resource_version, payload.resource_version.as_deref())?;
                let identifier = require_identifier(payload.identifier.as_ref(), policy, "identifier")?;
                ensure_unique_tenant_identifier(state, &identifier, Some(tenant_uuid))?;

                let mut changes = ChangeSet::new();
                if identifier != current.identifier {
                    plan_full_identifier_refresh(state, tenant_uuid, &identifier, &mut changes);
                }

                let mut updated = current.clone();
                updated.identifier = identifier;
                updated.resource_version = new_resource_version();
                changes.put(updated.clone());
                Ok((updated, changes))
            })
            .await
    }

    /// Remove o tenant e, na mesma operação, tudo que vive dentro dele.
    pub async fn delete(&self, tenant_uuid: Uuid) -> Result<(), AppError> {
        self.store
            .write(|state| {
                state.tenant(tenant_uuid)?;
                let mut changes = ChangeSet::new();
                state.plan_tenant_removal(tenant_uuid, &mut changes);
                Ok(((), changes))
            })
            .await?;

        tracing::info!("🗑️ Tenant {} removido (cascata)", tenant_uuid);
        Ok(())
    }

    /// Liga (ou atualiza) uma feature flag no tenant.
    pub async fn bind_feature_flag(
        &self,
        tenant_uuid: Uuid,
        name: &str,
        enabled_for_new_projects: bool,
    ) -> Result<Tenant, AppError> {
        self.store
            .write(|state| {
                if !state.feature_flags.contains_key(name) {
                    return Err(AppError::NotFound("feature_flag"));
                }
                let mut tenant = state.tenant(tenant_uuid)?.clone();

                match tenant.feature_flags.iter_mut().find(|ff| ff.name == name) {
                    Some(existing) => existing.enabled_for_new_projects = enabled_for_new_projects,
                    None => tenant.feature_flags.push(TenantFeatureFlag {
                        name: name.to_string(),
                        enabled_for_new_projects,
                    }),
                }
                tenant.resource_version = new_resource_version();

                let mut changes = ChangeSet::new();
                changes.put(tenant.clone());
                Ok((tenant, changes))
            })
            .await
    }

    pub async fn unbind_feature_flag(&self, tenant_uuid: Uuid, name: &str) -> Result<Tenant, AppError> {
        self.store
            .write(|state| {
                if !state.feature_flags.contains_key(name) {
                    return Err(AppError::NotFound("feature_flag"));
                }
                let mut tenant = state.tenant(tenant_uuid)?.clone();

                let mut changes = ChangeSet::new();
                if tenant.feature_flags.iter().any(|ff| ff.name == name) {
                    tenant.feature_flags.retain(|ff| ff.name != name);
                    tenant.resource_version = new_resource_version();
                    changes.put(tenant.clone());
                }
                Ok((tenant, changes))
            })
            .await
    }

    /// Papéis cujo `require_one_of_feature_flags` cruza com as flags do tenant.
    pub async fn available_roles(&self, tenant_uuid: Uuid) -> Result<Vec<AvailableRole>, AppError> {
        self.store
            .read(|state| -> Result<_, AppError> {
                let tenant = state.tenant(tenant_uuid)?;
                let roles: Vec<AvailableRole> = state
                    .roles
                    .values()
                    .filter(|role| {
                        role.require_one_of_feature_flags
                            .iter()
                            .any(|flag| tenant.feature_flags.iter().any(|ff| &ff.name == flag))
                    })
                    .map(|role| AvailableRole {
                        name: role.name.clone(),
                        description: role.description.clone(),
                    })
                    .collect();
                Ok(roles)
            })
            .await
    }
}

fn ensure_unique_tenant_identifier(
    state: &IamState,
    identifier: &str,
    except: Option<Uuid>,
) -> Result<(), AppError> {
    let taken = state
        .tenants
        .values()
        .any(|t| t.identifier == identifier && Some(t.uuid) != except);
    if taken {
        return Err(AppError::AlreadyExists(format!(
            "tenant com identifier '{}'",
            identifier
        )));
    }
    Ok(())
}

/// Rotas privilegiadas exigem o uuid no corpo; as demais sempre geram um novo.
pub(crate) fn pick_uuid(
    privileged: bool,
    requested: Option<Uuid>,
    exists: impl Fn(Uuid) -> bool,
) -> Result<Uuid, AppError> {
    if !privileged {
        return Ok(new_uuid());
    }
    let id = requested.ok_or_else(|| {
        AppError::BadRequest("O campo 'uuid' é obrigatório na criação privilegiada.".into())
    })?;
    if exists(id) {
        return Err(AppError::AlreadyExists(format!("objeto com uuid {}", id)));
    }
    Ok(id)
}

// Identificadores completos carregam o identifier do tenant.
fn plan_full_identifier_refresh(
    state: &IamState,
    tenant_uuid: Uuid,
    tenant_identifier: &str,
    changes: &mut ChangeSet,
) {
    for user in state.users.values().filter(|u| u.tenant_uuid == tenant_uuid) {
        let mut updated = user.clone();
        updated.full_identifier =
            full_identifier(SubjectKind::User, &user.identifier, tenant_identifier);
        updated.resource_version = new_resource_version();
        changes.put(updated);
    }
    for sa in state.service_accounts.values().filter(|s| s.tenant_uuid == tenant_uuid) {
        let mut updated = sa.clone();
        updated.full_identifier =
            full_identifier(SubjectKind::ServiceAccount, &sa.identifier, tenant_identifier);
        updated.resource_version = new_resource_version();
        changes.put(updated);
    }
    for group in state.groups.values().filter(|g| g.tenant_uuid == tenant_uuid) {
        let mut updated = group.clone();
        updated.full_identifier =
            full_identifier(SubjectKind::Group, &group.identifier, tenant_identifier);
        updated.resource_version = new_resource_version();
        changes.put(updated);
    }
}

#[derive(Clone)]
pub struct ProjectService {
    store: IamStore,
    policy: IdentifierPolicy,
}

impl ProjectService {
    pub fn new(store: IamStore, policy: IdentifierPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn create(
        &self,
        tenant_uuid: Uuid,
        payload: ProjectPayload,
        privileged: bool,
    ) -> Result<Project, AppError> {
        let policy = self.policy;
        let project = self
            .store
            .write(move |state| {
                let tenant = state.tenant(tenant_uuid)?;
                let uuid = pick_uuid(privileged, payload.uuid, |id| {
                    state.projects.contains_key(&id)
                })?;
                let identifier = require_identifier(payload.identifier.as_ref(), policy, "identifier")?;
                state.ensure_unique_identifier::<Project>(tenant_uuid, &identifier, None)?;

                // Projetos novos herdam as flags marcadas no tenant.
                let feature_flags = tenant
                    .feature_flags
                    .iter()
                    .filter(|ff| ff.enabled_for_new_projects)
                    .map(|ff| ff.name.clone())
                    .collect();

                let project = Project {
                    uuid,
                    tenant_uuid,
                    identifier,
                    resource_version: new_resource_version(),
                    feature_flags,
                };
                let mut changes = ChangeSet::new();
                changes.put(project.clone());
                Ok((project, changes))
            })
            .await?;

        tracing::debug!("Projeto {} criado no tenant {}", project.uuid, tenant_uuid);
        Ok(project)
    }

    pub async fn read(&self, tenant_uuid: Uuid, project_uuid: Uuid) -> Result<Project, AppError> {
        self.store
            .read(|state| state.scoped::<Project>(tenant_uuid, project_uuid).cloned())
            .await
    }

    pub async fn list(&self, tenant_uuid: Uuid) -> Result<Vec<Project>, AppError> {
        self.store
            .read(|state| -> Result<_, AppError> {
                state.tenant(tenant_uuid)?;
                Ok(state.scoped_list::<Project>(tenant_uuid))
            })
            .await
    }

    pub async fn update(
        &self,
        tenant_uuid: Uuid,
        project_uuid: Uuid,
        payload: ProjectPayload,
    ) -> Result<Project, AppError> {
        let policy = self.policy;
        self.store
            .write(move |state| {
                let current = state.scoped::<Project>(tenant_uuid, project_uuid)?;
                ensure_version(&current.resource_version, payload.resource_version.as_deref())?;
                let identifier = require_identifier(payload.identifier.as_ref(), policy, "identifier")?;
                state.ensure_unique_identifier::<Project>(tenant_uuid, &identifier, Some(project_uuid))?;

                let mut updated = current.clone();
                updated.identifier = identifier;
                updated.resource_version = new_resource_version();
                let mut changes = ChangeSet::new();
                changes.put(updated.clone());
                Ok((updated, changes))
            })
            .await
    }

    pub async fn delete(&self, tenant_uuid: Uuid, project_uuid: Uuid) -> Result<(), AppError> {
        self.store
            .write(|state| {
                state.scoped::<Project>(tenant_uuid, project_uuid)?;
                let mut changes = ChangeSet::new();
                changes.delete(ObjectKey::Project(project_uuid));
                Ok(((), changes))
            })
            .await
    }

    pub async fn bind_feature_flag(
        &self,
        tenant_uuid: Uuid,
        project_uuid: Uuid,
        name: &str,
    ) -> Result<Project, AppError> {
        self.store
            .write(|state| {
                if !state.feature_flags.contains_key(name) {
                    return Err(AppError::NotFound("feature_flag"));
                }
                let mut project = state.scoped::<Project>(tenant_uuid, project_uuid)?.clone();

                let mut changes = ChangeSet::new();
                if !project.feature_flags.iter().any(|ff| ff == name) {
                    project.feature_flags.push(name.to_string());
                    project.resource_version = new_resource_version();
                    changes.put(project.clone());
                }
                Ok((project, changes))
            })
            .await
    }

    pub async fn unbind_feature_flag(
        &self,
        tenant_uuid: Uuid,
        project_uuid: Uuid,
        name: &str,
    ) -> Result<Project, AppError> {
        self.store
            .write(|state| {
                if !state.feature_flags.contains_key(name) {
                    return Err(AppError::NotFound("feature_flag"));
                }
                let mut project = state.scoped::<Project>(tenant_uuid, project_uuid)?.clone();

                let mut changes = ChangeSet::new();
                if project.feature_flags.iter().any(|ff| ff == name) {
                    project.feature_flags.retain(|ff| ff != name);
                    project.resource_version = new_resource_version();
                    changes.put(project.clone());
                }
                Ok((project, changes))
            })
            .await
    }
}
