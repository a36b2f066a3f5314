// src/models/identity.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::{
    identifier::IdentifierInput,
    response::ApiResource,
    validation::{validate_cidrs, validate_optional_email},
};

// ---
// 1. User
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub uuid: Uuid,
    pub tenant_uuid: Uuid,
    pub identifier: String,
    /// `identifier@<tenant.identifier>`
    pub full_identifier: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub additional_emails: Vec<String>,
    #[serde(default)]
    pub mobile_phone: String,
    #[serde(default)]
    pub additional_phones: Vec<String>,
    pub resource_version: String,
}

impl ApiResource for User {
    const SINGULAR: &'static str = "user";
    const PLURAL: &'static str = "users";

    fn api_id(&self) -> String {
        self.uuid.to_string()
    }
}

// ---
// 2. ServiceAccount
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ServiceAccount {
    pub uuid: Uuid,
    pub tenant_uuid: Uuid,
    pub identifier: String,
    /// `identifier@serviceaccount.<tenant.identifier>`
    pub full_identifier: String,
    #[serde(default)]
    pub allowed_cidrs: Vec<String>,
    #[serde(default)]
    pub token_ttl: u64,
    #[serde(default)]
    pub token_max_ttl: u64,
    pub resource_version: String,
}

impl ApiResource for ServiceAccount {
    const SINGULAR: &'static str = "service_account";
    const PLURAL: &'static str = "service_accounts";

    fn api_id(&self) -> String {
        self.uuid.to_string()
    }
}

// ---
// 3. Group
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Group {
    pub uuid: Uuid,
    pub tenant_uuid: Uuid,
    pub identifier: String,
    /// `identifier@group.<tenant.identifier>`
    pub full_identifier: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    pub resource_version: String,
}

impl ApiResource for Group {
    const SINGULAR: &'static str = "group";
    const PLURAL: &'static str = "groups";

    fn api_id(&self) -> String {
        self.uuid.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    User,
    Group,
    ServiceAccount,
}

/// Referência a um user, group ou service account do mesmo tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Subject {
    #[serde(rename = "type")]
    pub kind: SubjectKind,
    pub id: Uuid,
}

impl Subject {
    pub fn new(kind: SubjectKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

// ---
// Payloads
// ---
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UserPayload {
    pub uuid: Option<Uuid>,
    #[schema(value_type = Option<String>)]
    pub identifier: Option<IdentifierInput>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    #[validate(custom(function = "validate_optional_email"))]
    pub email: Option<String>,
    pub additional_emails: Option<Vec<String>>,
    pub mobile_phone: Option<String>,
    pub additional_phones: Option<Vec<String>>,
    pub resource_version: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ServiceAccountPayload {
    pub uuid: Option<Uuid>,
    #[schema(value_type = Option<String>)]
    pub identifier: Option<IdentifierInput>,
    #[validate(custom(function = "validate_cidrs"))]
    pub allowed_cidrs: Option<Vec<String>>,
    pub token_ttl: Option<u64>,
    pub token_max_ttl: Option<u64>,
    pub resource_version: Option<String>,
}

/// Membros podem vir como `subjects` ou nas listas planas por tipo.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct SubjectsInput {
    pub subjects: Option<Vec<Subject>>,
    pub users: Option<Vec<Uuid>>,
    pub groups: Option<Vec<Uuid>>,
    pub service_accounts: Option<Vec<Uuid>>,
}

impl SubjectsInput {
    /// `subjects` primeiro, depois users, groups e service_accounts. Duplicatas são descartadas.
    pub fn collect(&self) -> Vec<Subject> {
        let flat = [
            (SubjectKind::User, &self.users),
            (SubjectKind::Group, &self.groups),
            (SubjectKind::ServiceAccount, &self.service_accounts),
        ];

        let mut out: Vec<Subject> = self.subjects.clone().unwrap_or_default();
        for (kind, ids) in flat {
            for id in ids.iter().flatten() {
                out.push(Subject::new(kind, *id));
            }
        }

        let mut seen = std::collections::HashSet::new();
        out.retain(|subject| seen.insert(*subject));
        out
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GroupPayload {
    pub uuid: Option<Uuid>,
    #[schema(value_type = Option<String>)]
    pub identifier: Option<IdentifierInput>,
    #[serde(flatten)]
    pub members: SubjectsInput,
    pub resource_version: Option<String>,
}
