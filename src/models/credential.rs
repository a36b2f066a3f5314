// src/models/credential.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::{ids::MAX_TTL, response::ApiResource, validation::validate_cidrs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OwnerType {
    User,
    ServiceAccount,
}

// ---
// 1. Multipass
// ---
// Forma persistida. `salt` e `generation` nunca saem pela API depois da criação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Multipass {
    pub uuid: Uuid,
    pub tenant_uuid: Uuid,
    pub owner_uuid: Uuid,
    pub owner_type: OwnerType,
    pub description: String,
    pub ttl: u64,
    pub max_ttl: u64,
    pub valid_till: i64,
    pub allowed_cidrs: Vec<String>,
    pub allowed_roles: Vec<String>,
    pub salt: String,
    /// Entra no `jti` junto com o salt. Nasce em 0; reservado para rotação do
    /// token: incrementar invalida os tokens já emitidos sem trocar o salt.
    pub generation: u64,
}

/// O que read/list devolvem.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MultipassView {
    pub uuid: Uuid,
    pub tenant_uuid: Uuid,
    pub owner_uuid: Uuid,
    pub owner_type: OwnerType,
    pub description: String,
    pub ttl: u64,
    pub max_ttl: u64,
    pub valid_till: i64,
    pub allowed_cidrs: Vec<String>,
    pub allowed_roles: Vec<String>,
}

impl From<&Multipass> for MultipassView {
    fn from(m: &Multipass) -> Self {
        Self {
            uuid: m.uuid,
            tenant_uuid: m.tenant_uuid,
            owner_uuid: m.owner_uuid,
            owner_type: m.owner_type,
            description: m.description.clone(),
            ttl: m.ttl,
            max_ttl: m.max_ttl,
            valid_till: m.valid_till,
            allowed_cidrs: m.allowed_cidrs.clone(),
            allowed_roles: m.allowed_roles.clone(),
        }
    }
}

impl ApiResource for MultipassView {
    const SINGULAR: &'static str = "multipass";
    const PLURAL: &'static str = "multipasses";

    fn api_id(&self) -> String {
        self.uuid.to_string()
    }
}

/// Resposta da criação: a única vez que o salt e o token aparecem.
#[derive(Debug, Serialize, ToSchema)]
pub struct IssuedMultipass {
    pub multipass: IssuedMultipassBody,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IssuedMultipassBody {
    #[serde(flatten)]
    pub view: MultipassView,
    pub salt: String,
}

// ---
// 2. Password (apenas service accounts)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Password {
    pub uuid: Uuid,
    pub tenant_uuid: Uuid,
    pub owner_uuid: Uuid,
    pub description: String,
    pub ttl: u64,
    pub valid_till: i64,
    pub allowed_cidrs: Vec<String>,
    pub allowed_roles: Vec<String>,
    /// Hash bcrypt do segredo. O texto puro nunca é guardado.
    pub secret_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PasswordView {
    pub uuid: Uuid,
    pub tenant_uuid: Uuid,
    pub owner_uuid: Uuid,
    pub description: String,
    pub ttl: u64,
    pub valid_till: i64,
    pub allowed_cidrs: Vec<String>,
    pub allowed_roles: Vec<String>,
}

impl From<&Password> for PasswordView {
    fn from(p: &Password) -> Self {
        Self {
            uuid: p.uuid,
            tenant_uuid: p.tenant_uuid,
            owner_uuid: p.owner_uuid,
            description: p.description.clone(),
            ttl: p.ttl,
            valid_till: p.valid_till,
            allowed_cidrs: p.allowed_cidrs.clone(),
            allowed_roles: p.allowed_roles.clone(),
        }
    }
}

impl ApiResource for PasswordView {
    const SINGULAR: &'static str = "password";
    const PLURAL: &'static str = "passwords";

    fn api_id(&self) -> String {
        self.uuid.to_string()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IssuedPassword {
    #[serde(flatten)]
    pub view: PasswordView,
    pub secret: String,
}

impl ApiResource for IssuedPassword {
    const SINGULAR: &'static str = "password";
    const PLURAL: &'static str = "passwords";

    fn api_id(&self) -> String {
        self.view.uuid.to_string()
    }
}

// ---
// Payloads
// ---
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct MultipassPayload {
    #[validate(
        required(message = "O campo 'ttl' é obrigatório."),
        range(min = 1, max = MAX_TTL, message = "O campo 'ttl' deve estar entre 1 e cem anos.")
    )]
    pub ttl: Option<u64>,
    pub max_ttl: Option<u64>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_cidrs"))]
    pub allowed_cidrs: Option<Vec<String>>,
    pub allowed_roles: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct PasswordPayload {
    #[validate(
        required(message = "O campo 'ttl' é obrigatório."),
        range(min = 1, max = MAX_TTL, message = "O campo 'ttl' deve estar entre 1 e cem anos.")
    )]
    pub ttl: Option<u64>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_cidrs"))]
    pub allowed_cidrs: Option<Vec<String>>,
    pub allowed_roles: Option<Vec<String>>,
}
