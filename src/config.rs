// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;

use crate::{
    common::identifier::IdentifierPolicy,
    db::{IamStore, Journal, PgJournal},
    services::{
        auth::AuthService,
        credential_service::CredentialService,
        identity_service::{GroupService, ServiceAccountService, UserService},
        rbac_service::{FeatureFlagService, RoleBindingService, RoleService},
        tenancy_service::{ProjectService, TenantService},
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub root_token: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub identifier_policy: IdentifierPolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let root_token = env::var("IAM_ROOT_TOKEN")
            .map_err(|_| anyhow::anyhow!("IAM_ROOT_TOKEN deve ser definido"))?;
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET deve ser definido"))?;

        let database_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse()?,
            Err(_) => 5,
        };
        let identifier_policy = match env::var("IDENTIFIER_POLICY") {
            Ok(raw) => raw.parse()?,
            Err(_) => IdentifierPolicy::default(),
        };

        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            database_max_connections,
            root_token,
            jwt_secret,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "iam-backend".to_string()),
            identifier_policy,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub tenant_service: TenantService,
    pub project_service: ProjectService,
    pub user_service: UserService,
    pub service_account_service: ServiceAccountService,
    pub group_service: GroupService,
    pub role_service: RoleService,
    pub role_binding_service: RoleBindingService,
    pub feature_flag_service: FeatureFlagService,
    pub credential_service: CredentialService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = match &config.database_url {
            Some(database_url) => {
                let db_pool = PgPoolOptions::new()
                    .max_connections(config.database_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                let journal: Arc<dyn Journal> = Arc::new(PgJournal::new(db_pool));
                IamStore::open(journal).await?
            }
            None => {
                tracing::warn!("DATABASE_URL ausente: estado apenas em memória");
                IamStore::in_memory()
            }
        };

        Ok(Self::with_store(config, store))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(config: Config, store: IamStore) -> Self {
        let policy = config.identifier_policy;
        let auth_service = AuthService::new(
            store.clone(),
            config.root_token,
            config.jwt_secret,
            config.jwt_issuer,
        );

        Self {
            tenant_service: TenantService::new(store.clone(), policy),
            project_service: ProjectService::new(store.clone(), policy),
            user_service: UserService::new(store.clone(), policy),
            service_account_service: ServiceAccountService::new(store.clone(), policy),
            group_service: GroupService::new(store.clone(), policy),
            role_service: RoleService::new(store.clone(), policy),
            role_binding_service: RoleBindingService::new(store.clone()),
            feature_flag_service: FeatureFlagService::new(store.clone(), policy),
            credential_service: CredentialService::new(store, auth_service.clone()),
            auth_service,
        }
    }
}
