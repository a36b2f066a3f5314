// src/models/rbac.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::{identifier::IdentifierInput, ids::MAX_TTL, response::ApiResource};
use crate::models::identity::{Subject, SubjectsInput};

// ---
// 1. Role (global, chave = name)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
    #[default]
    Tenant,
    Project,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IncludedRole {
    pub name: String,
    #[serde(default)]
    pub options_template: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub scope: RoleScope,
    #[serde(default)]
    pub options_schema: String,
    #[serde(default)]
    pub require_one_of_feature_flags: Vec<String>,
    #[serde(default)]
    pub included_roles: Vec<IncludedRole>,
}

impl ApiResource for Role {
    const SINGULAR: &'static str = "role";
    const PLURAL: &'static str = "roles";
    const ID_LIST: &'static str = "names";

    fn api_id(&self) -> String {
        self.name.clone()
    }
}

// ---
// 2. FeatureFlag (global, chave = name)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeatureFlag {
    pub name: String,
}

impl ApiResource for FeatureFlag {
    const SINGULAR: &'static str = "feature_flag";
    const PLURAL: &'static str = "feature_flags";
    const ID_LIST: &'static str = "names";

    fn api_id(&self) -> String {
        self.name.clone()
    }
}

// ---
// 3. RoleBinding (dentro de um tenant)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BoundRole {
    pub name: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RoleBinding {
    pub uuid: Uuid,
    pub tenant_uuid: Uuid,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub roles: Vec<BoundRole>,
    pub ttl: u64,
    /// Unix timestamp (segundos): momento da emissão + ttl.
    pub valid_till: i64,
    #[serde(default)]
    pub require_mfa: bool,
    pub resource_version: String,
}

impl ApiResource for RoleBinding {
    const SINGULAR: &'static str = "role_binding";
    const PLURAL: &'static str = "role_bindings";

    fn api_id(&self) -> String {
        self.uuid.to_string()
    }
}

// ---
// Payloads
// ---
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RolePayload {
    #[schema(value_type = Option<String>)]
    pub name: Option<IdentifierInput>,
    pub description: Option<String>,
    pub scope: Option<RoleScope>,
    pub options_schema: Option<String>,
    pub require_one_of_feature_flags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct IncludeRolePayload {
    pub options_template: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FeatureFlagPayload {
    #[schema(value_type = Option<String>)]
    pub name: Option<IdentifierInput>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct RoleBindingPayload {
    pub uuid: Option<Uuid>,
    #[serde(flatten)]
    pub members: SubjectsInput,
    pub roles: Option<Vec<BoundRole>>,
    #[validate(
        required(message = "O campo 'ttl' é obrigatório."),
        range(min = 1, max = MAX_TTL, message = "O campo 'ttl' deve estar entre 1 e cem anos.")
    )]
    pub ttl: Option<u64>,
    pub require_mfa: Option<bool>,
    pub resource_version: Option<String>,
}
