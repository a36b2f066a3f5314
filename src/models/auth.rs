// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Emitido por quem detém a chave compartilhada.
    Operator,
    /// Emitido por este serviço na criação de um multipass.
    Multipass,
}

// Claims dos JWTs aceitos pela API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub iat: usize,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Ausente = acesso root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_uuid: Option<Uuid>,
    pub kind: TokenKind,
}

/// Quem está chamando, depois do auth_guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Root,
    Tenant(Uuid),
}

impl Caller {
    pub fn can_access_tenant(&self, tenant_uuid: Uuid) -> bool {
        match self {
            Caller::Root => true,
            Caller::Tenant(own) => *own == tenant_uuid,
        }
    }
}
