// src/services/identity_service.rs

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        identifier::{require_identifier, IdentifierPolicy},
        ids::new_resource_version,
    },
    db::{ensure_version, ChangeSet, IamState, IamStore, ObjectKey, Scoped},
    models::identity::{
        Group, GroupPayload, ServiceAccount, ServiceAccountPayload, Subject, SubjectKind, User,
        UserPayload,
    },
    services::tenancy_service::pick_uuid,
};

/// `john@acme`, `ci@serviceaccount.acme`, `admins@group.acme`
pub fn full_identifier(kind: SubjectKind, identifier: &str, tenant_identifier: &str) -> String {
    match kind {
        SubjectKind::User => format!("{}@{}", identifier, tenant_identifier),
        SubjectKind::ServiceAccount => {
            format!("{}@serviceaccount.{}", identifier, tenant_identifier)
        }
        SubjectKind::Group => format!("{}@group.{}", identifier, tenant_identifier),
    }
}

/// Todo subject precisa existir no mesmo tenant.
pub(crate) fn check_subjects(
    state: &IamState,
    tenant_uuid: Uuid,
    subjects: &[Subject],
) -> Result<(), AppError> {
    for subject in subjects {
        let found = match subject.kind {
            SubjectKind::User => state.scoped::<User>(tenant_uuid, subject.id).is_ok(),
            SubjectKind::ServiceAccount => {
                state.scoped::<ServiceAccount>(tenant_uuid, subject.id).is_ok()
            }
            SubjectKind::Group => state.scoped::<Group>(tenant_uuid, subject.id).is_ok(),
        };
        if !found {
            return Err(AppError::BadRequest(format!(
                "Subject {:?} {} não existe neste tenant.",
                subject.kind, subject.id
            )));
        }
    }
    Ok(())
}

// Substituição completa: o que não veio volta ao padrão.
fn fill_user(user: &mut User, payload: UserPayload) {
    user.first_name = payload.first_name.unwrap_or_default();
    user.last_name = payload.last_name.unwrap_or_default();
    user.display_name = payload.display_name.unwrap_or_default();
    user.email = payload.email.unwrap_or_default();
    user.additional_emails = payload.additional_emails.unwrap_or_default();
    user.mobile_phone = payload.mobile_phone.unwrap_or_default();
    user.additional_phones = payload.additional_phones.unwrap_or_default();
}

#[derive(Clone)]
pub struct UserService {
    store: IamStore,
    policy: IdentifierPolicy,
}

impl UserService {
    pub fn new(store: IamStore, policy: IdentifierPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn create(
        &self,
        tenant_uuid: Uuid,
        payload: UserPayload,
        privileged: bool,
    ) -> Result<User, AppError> {
        let policy = self.policy;
        let user = self
            .store
            .write(move |state| {
                let tenant = state.tenant(tenant_uuid)?;
                payload.validate()?;
                let uuid = pick_uuid(privileged, payload.uuid, |id| state.users.contains_key(&id))?;
                let identifier = require_identifier(payload.identifier.as_ref(), policy, "identifier")?;
                state.ensure_unique_identifier::<User>(tenant_uuid, &identifier, None)?;

                let mut user = User {
                    uuid,
                    tenant_uuid,
                    full_identifier: full_identifier(SubjectKind::User, &identifier, &tenant.identifier),
                    identifier,
                    first_name: String::new(),
                    last_name: String::new(),
                    display_name: String::new(),
                    email: String::new(),
                    additional_emails: Vec::new(),
                    mobile_phone: String::new(),
                    additional_phones: Vec::new(),
                    resource_version: new_resource_version(),
                };
                fill_user(&mut user, payload);

                let mut changes = ChangeSet::new();
                changes.put(user.clone());
                Ok((user, changes))
            })
            .await?;

        tracing::debug!("Usuário {} criado no tenant {}", user.full_identifier, tenant_uuid);
        Ok(user)
    }

    pub async fn read(&self, tenant_uuid: Uuid, user_uuid: Uuid) -> Result<User, AppError> {
        self.store
            .read(|state| state.scoped::<User>(tenant_uuid, user_uuid).cloned())
            .await
    }

    pub async fn list(&self, tenant_uuid: Uuid) -> Result<Vec<User>, AppError> {
        self.store
            .read(|state| -> Result<_, AppError> {
                state.tenant(tenant_uuid)?;
                Ok(state.scoped_list::<User>(tenant_uuid))
            })
            .await
    }

    pub async fn update(
        &self,
        tenant_uuid: Uuid,
        user_uuid: Uuid,
        payload: UserPayload,
    ) -> Result<User, AppError> {
        let policy = self.policy;
        self.store
            .write(move |state| {
                let current = state.scoped::<User>(tenant_uuid, user_uuid)?;
                ensure_version(&current.resource_version, payload.resource_version.as_deref())?;
                payload.validate()?;
                let identifier = require_identifier(payload.identifier.as_ref(), policy, "identifier")?;
                state.ensure_unique_identifier::<User>(tenant_uuid, &identifier, Some(user_uuid))?;
                let tenant = state.tenant(tenant_uuid)?;

                let mut updated = current.clone();
                updated.full_identifier = full_identifier(SubjectKind::User, &identifier, &tenant.identifier);
                updated.identifier = identifier;
                updated.resource_version = new_resource_version();
                fill_user(&mut updated, payload);

                let mut changes = ChangeSet::new();
                changes.put(updated.clone());
                Ok((updated, changes))
            })
            .await
    }

    /// Apaga o usuário, os seus multipasses e as referências em grupos e role bindings.
    pub async fn delete(&self, tenant_uuid: Uuid, user_uuid: Uuid) -> Result<(), AppError> {
        self.store
            .write(|state| {
                state.scoped::<User>(tenant_uuid, user_uuid)?;
                let mut changes = ChangeSet::new();
                plan_owner_credentials_removal(state, user_uuid, &mut changes);
                state.plan_subject_removal(
                    tenant_uuid,
                    Subject::new(SubjectKind::User, user_uuid),
                    &mut changes,
                );
                changes.delete(User::key(user_uuid));
                Ok(((), changes))
            })
            .await
    }
}

fn plan_owner_credentials_removal(state: &IamState, owner_uuid: Uuid, changes: &mut ChangeSet) {
    for mp in state.multipasses.values().filter(|m| m.owner_uuid == owner_uuid) {
        changes.delete(ObjectKey::Multipass(mp.uuid));
    }
    for password in state.passwords.values().filter(|p| p.owner_uuid == owner_uuid) {
        changes.delete(ObjectKey::Password(password.uuid));
    }
}

#[derive(Clone)]
pub struct ServiceAccountService {
    store: IamStore,
    policy: IdentifierPolicy,
}

impl ServiceAccountService {
    pub fn new(store: IamStore, policy: IdentifierPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn create(
        &self,
        tenant_uuid: Uuid,
        payload: ServiceAccountPayload,
        privileged: bool,
    ) -> Result<ServiceAccount, AppError> {
        let policy = self.policy;
        let sa = self
            .store
            .write(move |state| {
                let tenant = state.tenant(tenant_uuid)?;
                payload.validate()?;
                let uuid = pick_uuid(privileged, payload.uuid, |id| {
                    state.service_accounts.contains_key(&id)
                })?;
                let identifier = require_identifier(payload.identifier.as_ref(), policy, "identifier")?;
                state.ensure_unique_identifier::<ServiceAccount>(tenant_uuid, &identifier, None)?;

                let sa = ServiceAccount {
                    uuid,
                    tenant_uuid,
                    full_identifier: full_identifier(
                        SubjectKind::ServiceAccount,
                        &identifier,
                        &tenant.identifier,
                    ),
                    identifier,
                    allowed_cidrs: payload.allowed_cidrs.unwrap_or_default(),
                    token_ttl: payload.token_ttl.unwrap_or_default(),
                    token_max_ttl: payload.token_max_ttl.unwrap_or_default(),
                    resource_version: new_resource_version(),
                };
                let mut changes = ChangeSet::new();
                changes.put(sa.clone());
                Ok((sa, changes))
            })
            .await?;

        tracing::debug!("Service account {} criada", sa.full_identifier);
        Ok(sa)
    }

    pub async fn read(&self, tenant_uuid: Uuid, sa_uuid: Uuid) -> Result<ServiceAccount, AppError> {
        self.store
            .read(|state| state.scoped::<ServiceAccount>(tenant_uuid, sa_uuid).cloned())
            .await
    }

    pub async fn list(&self, tenant_uuid: Uuid) -> Result<Vec<ServiceAccount>, AppError> {
        self.store
            .read(|state| -> Result<_, AppError> {
                state.tenant(tenant_uuid)?;
                Ok(state.scoped_list::<ServiceAccount>(tenant_uuid))
            })
            .await
    }

    pub async fn update(
        &self,
        tenant_uuid: Uuid,
        sa_uuid: Uuid,
        payload: ServiceAccountPayload,
    ) -> Result<ServiceAccount, AppError> {
        let policy = self.policy;
        self.store
            .write(move |state| {
                let current = state.scoped::<ServiceAccount>(tenant_uuid, sa_uuid)?;
                ensure_version(&current.resource_version, payload.resource_version.as_deref())?;
                payload.validate()?;
                let identifier = require_identifier(payload.identifier.as_ref(), policy, "identifier")?;
                state.ensure_unique_identifier::<ServiceAccount>(tenant_uuid, &identifier, Some(sa_uuid))?;
                let tenant = state.tenant(tenant_uuid)?;

                let mut updated = current.clone();
                updated.full_identifier =
                    full_identifier(SubjectKind::ServiceAccount, &identifier, &tenant.identifier);
                updated.identifier = identifier;
                updated.allowed_cidrs = payload.allowed_cidrs.unwrap_or_default();
                updated.token_ttl = payload.token_ttl.unwrap_or_default();
                updated.token_max_ttl = payload.token_max_ttl.unwrap_or_default();
                updated.resource_version = new_resource_version();

                let mut changes = ChangeSet::new();
                changes.put(updated.clone());
                Ok((updated, changes))
            })
            .await
    }

    /// Leva junto multipasses, senhas e referências como subject.
    pub async fn delete(&self, tenant_uuid: Uuid, sa_uuid: Uuid) -> Result<(), AppError> {
        self.store
            .write(|state| {
                state.scoped::<ServiceAccount>(tenant_uuid, sa_uuid)?;
                let mut changes = ChangeSet::new();
                plan_owner_credentials_removal(state, sa_uuid, &mut changes);
                state.plan_subject_removal(
                    tenant_uuid,
                    Subject::new(SubjectKind::ServiceAccount, sa_uuid),
                    &mut changes,
                );
                changes.delete(ServiceAccount::key(sa_uuid));
                Ok(((), changes))
            })
            .await
    }
}

#[derive(Clone)]
pub struct GroupService {
    store: IamStore,
    policy: IdentifierPolicy,
}

impl GroupService {
    pub fn new(store: IamStore, policy: IdentifierPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn create(
        &self,
        tenant_uuid: Uuid,
        payload: GroupPayload,
        privileged: bool,
    ) -> Result<Group, AppError> {
        let policy = self.policy;
        self.store
            .write(move |state| {
                let tenant = state.tenant(tenant_uuid)?;
                let uuid = pick_uuid(privileged, payload.uuid, |id| state.groups.contains_key(&id))?;
                let identifier = require_identifier(payload.identifier.as_ref(), policy, "identifier")?;
                state.ensure_unique_identifier::<Group>(tenant_uuid, &identifier, None)?;
                let subjects = payload.members.collect();
                check_subjects(state, tenant_uuid, &subjects)?;

                let group = Group {
                    uuid,
                    tenant_uuid,
                    full_identifier: full_identifier(SubjectKind::Group, &identifier, &tenant.identifier),
                    identifier,
                    subjects,
                    resource_version: new_resource_version(),
                };
                let mut changes = ChangeSet::new();
                changes.put(group.clone());
                Ok((group, changes))
            })
            .await
    }

    pub async fn read(&self, tenant_uuid: Uuid, group_uuid: Uuid) -> Result<Group, AppError> {
        self.store
            .read(|state| state.scoped::<Group>(tenant_uuid, group_uuid).cloned())
            .await
    }

    pub async fn list(&self, tenant_uuid: Uuid) -> Result<Vec<Group>, AppError> {
        self.store
            .read(|state| -> Result<_, AppError> {
                state.tenant(tenant_uuid)?;
                Ok(state.scoped_list::<Group>(tenant_uuid))
            })
            .await
    }

    pub async fn update(
        &self,
        tenant_uuid: Uuid,
        group_uuid: Uuid,
        payload: GroupPayload,
    ) -> Result<Group, AppError> {
        let policy = self.policy;
        self.store
            .write(move |state| {
                let current = state.scoped::<Group>(tenant_uuid, group_uuid)?;
                ensure_version(&current.resource_version, payload.resource_version.as_deref())?;
                let identifier = require_identifier(payload.identifier.as_ref(), policy, "identifier")?;
                state.ensure_unique_identifier::<Group>(tenant_uuid, &identifier, Some(group_uuid))?;
                let subjects = payload.members.collect();
                if subjects.contains(&Subject::new(SubjectKind::Group, group_uuid)) {
                    return Err(AppError::BadRequest(
                        "Um grupo não pode conter a si mesmo.".into(),
                    ));
                }
                check_subjects(state, tenant_uuid, &subjects)?;
                let tenant = state.tenant(tenant_uuid)?;

                let mut updated = current.clone();
                updated.full_identifier = full_identifier(SubjectKind::Group, &identifier, &tenant.identifier);
                updated.identifier = identifier;
                updated.subjects = subjects;
                updated.resource_version = new_resource_version();

                let mut changes = ChangeSet::new();
                changes.put(updated.clone());
                Ok((updated, changes))
            })
            .await
    }

    pub async fn delete(&self, tenant_uuid: Uuid, group_uuid: Uuid) -> Result<(), AppError> {
        self.store
            .write(|state| {
                state.scoped::<Group>(tenant_uuid, group_uuid)?;
                let mut changes = ChangeSet::new();
                state.plan_subject_removal(
                    tenant_uuid,
                    Subject::new(SubjectKind::Group, group_uuid),
                    &mut changes,
                );
                changes.delete(Group::key(group_uuid));
                Ok(((), changes))
            })
            .await
    }
}
