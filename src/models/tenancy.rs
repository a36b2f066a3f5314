// src/models/tenancy.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::{identifier::IdentifierInput, response::ApiResource};

// ---
// 1. Tenant (a fronteira de isolamento)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Tenant {
    pub uuid: Uuid,
    pub identifier: String,
    pub resource_version: String,
    #[serde(default)]
    pub feature_flags: Vec<TenantFeatureFlag>,
}

impl ApiResource for Tenant {
    const SINGULAR: &'static str = "tenant";
    const PLURAL: &'static str = "tenants";

    fn api_id(&self) -> String {
        self.uuid.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TenantFeatureFlag {
    pub name: String,
    pub enabled_for_new_projects: bool,
}

// ---
// 2. Project (sempre dentro de um tenant)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub uuid: Uuid,
    pub tenant_uuid: Uuid,
    pub identifier: String,
    pub resource_version: String,
    #[serde(default)]
    pub feature_flags: Vec<String>,
}

impl ApiResource for Project {
    const SINGULAR: &'static str = "project";
    const PLURAL: &'static str = "projects";

    fn api_id(&self) -> String {
        self.uuid.to_string()
    }
}

// ---
// Payloads
// ---
// O mesmo formato serve para criar (com ou sem `uuid` privilegiado) e atualizar.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TenantPayload {
    /// Só é considerado na rota `/privileged`.
    pub uuid: Option<Uuid>,
    #[schema(value_type = Option<String>)]
    pub identifier: Option<IdentifierInput>,
    /// Obrigatório na atualização.
    pub resource_version: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProjectPayload {
    pub uuid: Option<Uuid>,
    #[schema(value_type = Option<String>)]
    pub identifier: Option<IdentifierInput>,
    pub resource_version: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TenantFeatureFlagPayload {
    #[serde(default = "default_enabled_for_new_projects")]
    pub enabled_for_new_projects: bool,
}

impl Default for TenantFeatureFlagPayload {
    fn default() -> Self {
        Self {
            enabled_for_new_projects: default_enabled_for_new_projects(),
        }
    }
}

fn default_enabled_for_new_projects() -> bool {
    true
}

/// Papel disponível para um tenant, de acordo com as suas feature flags.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AvailableRole {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableRoles {
    pub available_roles: Vec<AvailableRole>,
}
