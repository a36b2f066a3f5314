// src/db/scoped.rs
// Acesso genérico aos recursos que vivem dentro de um tenant.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::state::{IamState, Object, ObjectKey},
    models::{
        credential::{Multipass, Password},
        identity::{Group, ServiceAccount, User},
        rbac::RoleBinding,
        tenancy::Project,
    },
};

pub trait Scoped: Clone + Into<Object> {
    /// Nome usado nas mensagens de 404.
    const RESOURCE: &'static str;

    fn uuid(&self) -> Uuid;
    fn tenant_uuid(&self) -> Uuid;
    fn key(uuid: Uuid) -> ObjectKey;
    fn table(state: &IamState) -> &BTreeMap<Uuid, Self>;
}

/// Recursos com `identifier` único dentro do tenant.
pub trait Identified: Scoped {
    fn identifier(&self) -> &str;
}

macro_rules! scoped {
    ($ty:ty, $resource:literal, $key:ident, $table:ident) => {
        impl Scoped for $ty {
            const RESOURCE: &'static str = $resource;

            fn uuid(&self) -> Uuid {
                self.uuid
            }

            fn tenant_uuid(&self) -> Uuid {
                self.tenant_uuid
            }

            fn key(uuid: Uuid) -> ObjectKey {
                ObjectKey::$key(uuid)
            }

            fn table(state: &IamState) -> &BTreeMap<Uuid, Self> {
                &state.$table
            }
        }
    };
}

scoped!(Project, "project", Project, projects);
scoped!(User, "user", User, users);
scoped!(ServiceAccount, "service_account", ServiceAccount, service_accounts);
scoped!(Group, "group", Group, groups);
scoped!(RoleBinding, "role_binding", RoleBinding, role_bindings);
scoped!(Multipass, "multipass", Multipass, multipasses);
scoped!(Password, "password", Password, passwords);

macro_rules! identified {
    ($($ty:ty),*) => {
        $(
            impl Identified for $ty {
                fn identifier(&self) -> &str {
                    &self.identifier
                }
            }
        )*
    };
}

identified!(Project, User, ServiceAccount, Group);

impl IamState {
    /// 404 se não existe ou se pertence a outro tenant.
    pub fn scoped<T: Scoped>(&self, tenant_uuid: Uuid, id: Uuid) -> Result<&T, AppError> {
        T::table(self)
            .get(&id)
            .filter(|o| o.tenant_uuid() == tenant_uuid)
            .ok_or(AppError::NotFound(T::RESOURCE))
    }

    pub fn scoped_list<T: Scoped>(&self, tenant_uuid: Uuid) -> Vec<T> {
        T::table(self)
            .values()
            .filter(|o| o.tenant_uuid() == tenant_uuid)
            .cloned()
            .collect()
    }

    pub fn ensure_unique_identifier<T: Identified>(
        &self,
        tenant_uuid: Uuid,
        identifier: &str,
        except: Option<Uuid>,
    ) -> Result<(), AppError> {
        let taken = T::table(self).values().any(|o| {
            o.tenant_uuid() == tenant_uuid
                && o.identifier() == identifier
                && Some(o.uuid()) != except
        });
        if taken {
            return Err(AppError::AlreadyExists(format!(
                "{} com identifier '{}'",
                T::RESOURCE,
                identifier
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ids::new_resource_version;

    fn user(tenant_uuid: Uuid, identifier: &str) -> User {
        User {
            uuid: Uuid::new_v4(),
            tenant_uuid,
            identifier: identifier.into(),
            full_identifier: format!("{}@t", identifier),
            first_name: String::new(),
            last_name: String::new(),
            display_name: String::new(),
            email: String::new(),
            additional_emails: vec![],
            mobile_phone: String::new(),
            additional_phones: vec![],
            resource_version: new_resource_version(),
        }
    }

    #[test]
    fn scoped_lookup_hides_other_tenants() {
        let mut state = IamState::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let u = user(a, "john");
        state.insert(u.clone().into());

        assert!(state.scoped::<User>(a, u.uuid).is_ok());
        assert!(matches!(
            state.scoped::<User>(b, u.uuid),
            Err(AppError::NotFound("user"))
        ));
        assert_eq!(state.scoped_list::<User>(a).len(), 1);
        assert!(state.scoped_list::<User>(b).is_empty());
    }

    #[test]
    fn identifier_unique_per_tenant() {
        let mut state = IamState::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let u = user(a, "john");
        state.insert(u.clone().into());

        assert!(state.ensure_unique_identifier::<User>(a, "john", None).is_err());
        assert!(state.ensure_unique_identifier::<User>(a, "john", Some(u.uuid)).is_ok());
        assert!(state.ensure_unique_identifier::<User>(b, "john", None).is_ok());
    }
}
