// src/db/state.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::{error::AppError, ids::new_resource_version},
    models::{
        credential::{Multipass, Password},
        identity::{Group, ServiceAccount, Subject, User},
        rbac::{FeatureFlag, Role, RoleBinding},
        tenancy::{Project, Tenant},
    },
};

// ---
// 1. Objeto persistido (uma linha do journal)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum Object {
    Tenant(Tenant),
    Project(Project),
    User(User),
    ServiceAccount(ServiceAccount),
    Group(Group),
    RoleBinding(RoleBinding),
    Multipass(Multipass),
    Password(Password),
    Role(Role),
    FeatureFlag(FeatureFlag),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKey {
    Tenant(Uuid),
    Project(Uuid),
    User(Uuid),
    ServiceAccount(Uuid),
    Group(Uuid),
    RoleBinding(Uuid),
    Multipass(Uuid),
    Password(Uuid),
    Role(String),
    FeatureFlag(String),
}

impl ObjectKey {
    pub fn kind(&self) -> &'static str {
        match self {
            ObjectKey::Tenant(_) => "tenant",
            ObjectKey::Project(_) => "project",
            ObjectKey::User(_) => "user",
            ObjectKey::ServiceAccount(_) => "service_account",
            ObjectKey::Group(_) => "group",
            ObjectKey::RoleBinding(_) => "role_binding",
            ObjectKey::Multipass(_) => "multipass",
            ObjectKey::Password(_) => "password",
            ObjectKey::Role(_) => "role",
            ObjectKey::FeatureFlag(_) => "feature_flag",
        }
    }

    pub fn id(&self) -> String {
        match self {
            ObjectKey::Tenant(id)
            | ObjectKey::Project(id)
            | ObjectKey::User(id)
            | ObjectKey::ServiceAccount(id)
            | ObjectKey::Group(id)
            | ObjectKey::RoleBinding(id)
            | ObjectKey::Multipass(id)
            | ObjectKey::Password(id) => id.to_string(),
            ObjectKey::Role(name) | ObjectKey::FeatureFlag(name) => name.clone(),
        }
    }
}

impl Object {
    pub fn key(&self) -> ObjectKey {
        match self {
            Object::Tenant(o) => ObjectKey::Tenant(o.uuid),
            Object::Project(o) => ObjectKey::Project(o.uuid),
            Object::User(o) => ObjectKey::User(o.uuid),
            Object::ServiceAccount(o) => ObjectKey::ServiceAccount(o.uuid),
            Object::Group(o) => ObjectKey::Group(o.uuid),
            Object::RoleBinding(o) => ObjectKey::RoleBinding(o.uuid),
            Object::Multipass(o) => ObjectKey::Multipass(o.uuid),
            Object::Password(o) => ObjectKey::Password(o.uuid),
            Object::Role(o) => ObjectKey::Role(o.name.clone()),
            Object::FeatureFlag(o) => ObjectKey::FeatureFlag(o.name.clone()),
        }
    }

    pub fn tenant_uuid(&self) -> Option<Uuid> {
        match self {
            Object::Tenant(o) => Some(o.uuid),
            Object::Project(o) => Some(o.tenant_uuid),
            Object::User(o) => Some(o.tenant_uuid),
            Object::ServiceAccount(o) => Some(o.tenant_uuid),
            Object::Group(o) => Some(o.tenant_uuid),
            Object::RoleBinding(o) => Some(o.tenant_uuid),
            Object::Multipass(o) => Some(o.tenant_uuid),
            Object::Password(o) => Some(o.tenant_uuid),
            Object::Role(_) | Object::FeatureFlag(_) => None,
        }
    }
}

macro_rules! into_object {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Object {
                fn from(value: $variant) -> Self {
                    Object::$variant(value)
                }
            }
        )*
    };
}

into_object!(
    Tenant,
    Project,
    User,
    ServiceAccount,
    Group,
    RoleBinding,
    Multipass,
    Password,
    Role,
    FeatureFlag,
);

// ---
// 2. Mudanças planejadas
// ---
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Put(Object),
    Delete(ObjectKey),
}

/// Tudo que uma operação altera. Aplicado de uma vez (journal e memória).
#[derive(Debug, Default)]
pub struct ChangeSet(Vec<Change>);

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, object: impl Into<Object>) {
        self.0.push(Change::Put(object.into()));
    }

    pub fn delete(&mut self, key: ObjectKey) {
        self.0.push(Change::Delete(key));
    }

    pub fn changes(&self) -> &[Change] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.0
    }
}

// ---
// 3. Estado em memória
// ---
#[derive(Debug, Default, Clone)]
pub struct IamState {
    pub tenants: BTreeMap<Uuid, Tenant>,
    pub projects: BTreeMap<Uuid, Project>,
    pub users: BTreeMap<Uuid, User>,
    pub service_accounts: BTreeMap<Uuid, ServiceAccount>,
    pub groups: BTreeMap<Uuid, Group>,
    pub role_bindings: BTreeMap<Uuid, RoleBinding>,
    pub multipasses: BTreeMap<Uuid, Multipass>,
    pub passwords: BTreeMap<Uuid, Password>,
    pub roles: BTreeMap<String, Role>,
    pub feature_flags: BTreeMap<String, FeatureFlag>,
}

impl IamState {
    pub fn apply(&mut self, change: Change) {
        match change {
            Change::Put(object) => self.insert(object),
            Change::Delete(key) => self.remove(&key),
        }
    }

    pub fn insert(&mut self, object: Object) {
        match object {
            Object::Tenant(o) => {
                self.tenants.insert(o.uuid, o);
            }
            Object::Project(o) => {
                self.projects.insert(o.uuid, o);
            }
            Object::User(o) => {
                self.users.insert(o.uuid, o);
            }
            Object::ServiceAccount(o) => {
                self.service_accounts.insert(o.uuid, o);
            }
            Object::Group(o) => {
                self.groups.insert(o.uuid, o);
            }
            Object::RoleBinding(o) => {
                self.role_bindings.insert(o.uuid, o);
            }
            Object::Multipass(o) => {
                self.multipasses.insert(o.uuid, o);
            }
            Object::Password(o) => {
                self.passwords.insert(o.uuid, o);
            }
            Object::Role(o) => {
                self.roles.insert(o.name.clone(), o);
            }
            Object::FeatureFlag(o) => {
                self.feature_flags.insert(o.name.clone(), o);
            }
        }
    }

    pub fn remove(&mut self, key: &ObjectKey) {
        match key {
            ObjectKey::Tenant(id) => {
                self.tenants.remove(id);
            }
            ObjectKey::Project(id) => {
                self.projects.remove(id);
            }
            ObjectKey::User(id) => {
                self.users.remove(id);
            }
            ObjectKey::ServiceAccount(id) => {
                self.service_accounts.remove(id);
            }
            ObjectKey::Group(id) => {
                self.groups.remove(id);
            }
            ObjectKey::RoleBinding(id) => {
                self.role_bindings.remove(id);
            }
            ObjectKey::Multipass(id) => {
                self.multipasses.remove(id);
            }
            ObjectKey::Password(id) => {
                self.passwords.remove(id);
            }
            ObjectKey::Role(name) => {
                self.roles.remove(name);
            }
            ObjectKey::FeatureFlag(name) => {
                self.feature_flags.remove(name);
            }
        }
    }

    pub fn tenant(&self, tenant_uuid: Uuid) -> Result<&Tenant, AppError> {
        self.tenants
            .get(&tenant_uuid)
            .ok_or(AppError::NotFound("tenant"))
    }

    /// Remove do grupo e das role bindings do tenant todas as referências ao subject.
    pub fn plan_subject_removal(&self, tenant_uuid: Uuid, subject: Subject, changes: &mut ChangeSet) {
        for group in self.groups.values() {
            if group.tenant_uuid == tenant_uuid && group.subjects.contains(&subject) {
                let mut updated = group.clone();
                updated.subjects.retain(|s| *s != subject);
                updated.resource_version = new_resource_version();
                changes.put(updated);
            }
        }
        for binding in self.role_bindings.values() {
            if binding.tenant_uuid == tenant_uuid && binding.subjects.contains(&subject) {
                let mut updated = binding.clone();
                updated.subjects.retain(|s| *s != subject);
                updated.resource_version = new_resource_version();
                changes.put(updated);
            }
        }
    }

    /// Apaga o tenant e tudo que pertence a ele.
    pub fn plan_tenant_removal(&self, tenant_uuid: Uuid, changes: &mut ChangeSet) {
        fn owned<T>(
            table: &BTreeMap<Uuid, T>,
            tenant_uuid: Uuid,
            tenant_of: impl Fn(&T) -> Uuid,
        ) -> Vec<Uuid> {
            table
                .iter()
                .filter(|(_, o)| tenant_of(o) == tenant_uuid)
                .map(|(id, _)| *id)
                .collect()
        }

        for id in owned(&self.passwords, tenant_uuid, |o| o.tenant_uuid) {
            changes.delete(ObjectKey::Password(id));
        }
        for id in owned(&self.multipasses, tenant_uuid, |o| o.tenant_uuid) {
            changes.delete(ObjectKey::Multipass(id));
        }
        for id in owned(&self.role_bindings, tenant_uuid, |o| o.tenant_uuid) {
            changes.delete(ObjectKey::RoleBinding(id));
        }
        for id in owned(&self.groups, tenant_uuid, |o| o.tenant_uuid) {
            changes.delete(ObjectKey::Group(id));
        }
        for id in owned(&self.service_accounts, tenant_uuid, |o| o.tenant_uuid) {
            changes.delete(ObjectKey::ServiceAccount(id));
        }
        for id in owned(&self.users, tenant_uuid, |o| o.tenant_uuid) {
            changes.delete(ObjectKey::User(id));
        }
        for id in owned(&self.projects, tenant_uuid, |o| o.tenant_uuid) {
            changes.delete(ObjectKey::Project(id));
        }
        changes.delete(ObjectKey::Tenant(tenant_uuid));
    }
}

/// Atualização exige a versão atual.
pub fn ensure_version(current: &str, given: Option<&str>) -> Result<(), AppError> {
    match given {
        Some(version) if version == current => Ok(()),
        _ => Err(AppError::VersionMismatch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::identity::SubjectKind;

    fn tenant(identifier: &str) -> Tenant {
        Tenant {
            uuid: Uuid::new_v4(),
            identifier: identifier.into(),
            resource_version: new_resource_version(),
            feature_flags: vec![],
        }
    }

    fn project(tenant_uuid: Uuid) -> Project {
        Project {
            uuid: Uuid::new_v4(),
            tenant_uuid,
            identifier: "p".into(),
            resource_version: new_resource_version(),
            feature_flags: vec![],
        }
    }

    #[test]
    fn tenant_removal_only_touches_its_objects() {
        let mut state = IamState::default();
        let a = tenant("a");
        let b = tenant("b");
        let pa = project(a.uuid);
        let pb = project(b.uuid);
        state.insert(a.clone().into());
        state.insert(b.clone().into());
        state.insert(pa.clone().into());
        state.insert(pb.clone().into());

        let mut changes = ChangeSet::new();
        state.plan_tenant_removal(a.uuid, &mut changes);
        for change in changes.into_changes() {
            state.apply(change);
        }

        assert!(!state.tenants.contains_key(&a.uuid));
        assert!(!state.projects.contains_key(&pa.uuid));
        assert!(state.tenants.contains_key(&b.uuid));
        assert!(state.projects.contains_key(&pb.uuid));
    }

    #[test]
    fn subject_removal_bumps_group_version() {
        let mut state = IamState::default();
        let t = tenant("t");
        let user_id = Uuid::new_v4();
        let subject = Subject::new(SubjectKind::User, user_id);
        let group = Group {
            uuid: Uuid::new_v4(),
            tenant_uuid: t.uuid,
            identifier: "g".into(),
            full_identifier: "g@group.t".into(),
            subjects: vec![subject],
            resource_version: new_resource_version(),
        };
        state.insert(group.clone().into());

        let mut changes = ChangeSet::new();
        state.plan_subject_removal(t.uuid, subject, &mut changes);
        for change in changes.into_changes() {
            state.apply(change);
        }

        let updated = &state.groups[&group.uuid];
        assert!(updated.subjects.is_empty());
        assert_ne!(updated.resource_version, group.resource_version);
    }

    #[test]
    fn version_must_match() {
        assert!(ensure_version("v1", Some("v1")).is_ok());
        assert!(matches!(ensure_version("v1", Some("v0")), Err(AppError::VersionMismatch)));
        assert!(matches!(ensure_version("v1", None), Err(AppError::VersionMismatch)));
    }

    #[test]
    fn object_round_trips_through_journal_format() {
        let t = tenant("acme");
        let value = serde_json::to_value(Object::from(t.clone())).unwrap();
        assert_eq!(value["kind"], "tenant");
        let back: Object = serde_json::from_value(value).unwrap();
        assert_eq!(back, Object::Tenant(t));
    }
}
