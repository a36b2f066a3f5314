// src/services/credential_service.rs

use bcrypt::hash;
use rand::{distr::Alphanumeric, Rng};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        ids::{new_uuid, valid_till},
    },
    db::{ChangeSet, IamState, IamStore, Scoped},
    models::{
        credential::{
            IssuedMultipass, IssuedMultipassBody, IssuedPassword, Multipass, MultipassPayload,
            MultipassView, OwnerType, Password, PasswordPayload, PasswordView,
        },
        identity::{ServiceAccount, User},
    },
    services::auth::AuthService,
};

const SECRET_LEN: usize = 32;

fn random_secret() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LEN)
        .map(char::from)
        .collect()
}

/// O dono precisa existir no tenant do caminho.
fn ensure_owner(
    state: &IamState,
    tenant_uuid: Uuid,
    owner_type: OwnerType,
    owner_uuid: Uuid,
) -> Result<(), AppError> {
    match owner_type {
        OwnerType::User => state.scoped::<User>(tenant_uuid, owner_uuid).map(|_| ()),
        OwnerType::ServiceAccount => state
            .scoped::<ServiceAccount>(tenant_uuid, owner_uuid)
            .map(|_| ()),
    }
}

fn owned_multipass<'a>(
    state: &'a IamState,
    tenant_uuid: Uuid,
    owner_type: OwnerType,
    owner_uuid: Uuid,
    multipass_uuid: Uuid,
) -> Result<&'a Multipass, AppError> {
    ensure_owner(state, tenant_uuid, owner_type, owner_uuid)?;
    state
        .scoped::<Multipass>(tenant_uuid, multipass_uuid)
        .ok()
        .filter(|mp| mp.owner_uuid == owner_uuid && mp.owner_type == owner_type)
        .ok_or(AppError::NotFound("multipass"))
}

fn owned_password<'a>(
    state: &'a IamState,
    tenant_uuid: Uuid,
    owner_uuid: Uuid,
    password_uuid: Uuid,
) -> Result<&'a Password, AppError> {
    ensure_owner(state, tenant_uuid, OwnerType::ServiceAccount, owner_uuid)?;
    state
        .scoped::<Password>(tenant_uuid, password_uuid)
        .ok()
        .filter(|p| p.owner_uuid == owner_uuid)
        .ok_or(AppError::NotFound("password"))
}

/// Multipasses (users e service accounts) e senhas (service accounts). Imutáveis depois de criados.
#[derive(Clone)]
pub struct CredentialService {
    store: IamStore,
    auth_service: AuthService,
}

impl CredentialService {
    pub fn new(store: IamStore, auth_service: AuthService) -> Self {
        Self {
            store,
            auth_service,
        }
    }

    pub async fn create_multipass(
        &self,
        tenant_uuid: Uuid,
        owner_type: OwnerType,
        owner_uuid: Uuid,
        payload: MultipassPayload,
    ) -> Result<IssuedMultipass, AppError> {
        let auth_service = self.auth_service.clone();
        let issued = self
            .store
            .write(move |state| {
                ensure_owner(state, tenant_uuid, owner_type, owner_uuid)?;
                payload.validate()?;

                let ttl = payload.ttl.unwrap_or_default();
                let multipass = Multipass {
                    uuid: new_uuid(),
                    tenant_uuid,
                    owner_uuid,
                    owner_type,
                    description: payload.description.unwrap_or_default(),
                    ttl,
                    max_ttl: payload.max_ttl.unwrap_or_default(),
                    valid_till: valid_till(ttl)?,
                    allowed_cidrs: payload.allowed_cidrs.unwrap_or_default(),
                    allowed_roles: payload.allowed_roles.unwrap_or_default(),
                    salt: random_secret(),
                    // Ainda não há rota de rotação.
                    generation: 0,
                };
                let token = auth_service.issue_multipass_token(&multipass)?;

                let issued = IssuedMultipass {
                    multipass: IssuedMultipassBody {
                        view: MultipassView::from(&multipass),
                        salt: multipass.salt.clone(),
                    },
                    token,
                };
                let mut changes = ChangeSet::new();
                changes.put(multipass);
                Ok((issued, changes))
            })
            .await?;

        tracing::info!(
            "🎫 Multipass {} emitido para {:?} {}",
            issued.multipass.view.uuid,
            owner_type,
            owner_uuid
        );
        Ok(issued)
    }

    pub async fn read_multipass(
        &self,
        tenant_uuid: Uuid,
        owner_type: OwnerType,
        owner_uuid: Uuid,
        multipass_uuid: Uuid,
    ) -> Result<MultipassView, AppError> {
        self.store
            .read(|state| {
                owned_multipass(state, tenant_uuid, owner_type, owner_uuid, multipass_uuid)
                    .map(MultipassView::from)
            })
            .await
    }

    pub async fn list_multipasses(
        &self,
        tenant_uuid: Uuid,
        owner_type: OwnerType,
        owner_uuid: Uuid,
    ) -> Result<Vec<MultipassView>, AppError> {
        self.store
            .read(|state| -> Result<_, AppError> {
                ensure_owner(state, tenant_uuid, owner_type, owner_uuid)?;
                Ok(state
                    .multipasses
                    .values()
                    .filter(|mp| {
                        mp.tenant_uuid == tenant_uuid
                            && mp.owner_uuid == owner_uuid
                            && mp.owner_type == owner_type
                    })
                    .map(MultipassView::from)
                    .collect::<Vec<_>>())
            })
            .await
    }

    pub async fn delete_multipass(
        &self,
        tenant_uuid: Uuid,
        owner_type: OwnerType,
        owner_uuid: Uuid,
        multipass_uuid: Uuid,
    ) -> Result<(), AppError> {
        self.store
            .write(|state| {
                owned_multipass(state, tenant_uuid, owner_type, owner_uuid, multipass_uuid)?;
                let mut changes = ChangeSet::new();
                changes.delete(Multipass::key(multipass_uuid));
                Ok(((), changes))
            })
            .await
    }

    pub async fn create_password(
        &self,
        tenant_uuid: Uuid,
        owner_uuid: Uuid,
        payload: PasswordPayload,
    ) -> Result<IssuedPassword, AppError> {
        // Falhas baratas antes do bcrypt.
        self.store
            .read(|state| ensure_owner(state, tenant_uuid, OwnerType::ServiceAccount, owner_uuid))
            .await?;
        payload.validate()?;

        let secret = random_secret();
        let secret_clone = secret.clone();
        let secret_hash = tokio::task::spawn_blocking(move || hash(&secret_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let view = self
            .store
            .write(move |state| {
                // O dono pode ter sumido enquanto o hash era calculado.
                ensure_owner(state, tenant_uuid, OwnerType::ServiceAccount, owner_uuid)?;

                let ttl = payload.ttl.unwrap_or_default();
                let password = Password {
                    uuid: new_uuid(),
                    tenant_uuid,
                    owner_uuid,
                    description: payload.description.unwrap_or_default(),
                    ttl,
                    valid_till: valid_till(ttl)?,
                    allowed_cidrs: payload.allowed_cidrs.unwrap_or_default(),
                    allowed_roles: payload.allowed_roles.unwrap_or_default(),
                    secret_hash,
                };
                let view = PasswordView::from(&password);
                let mut changes = ChangeSet::new();
                changes.put(password);
                Ok((view, changes))
            })
            .await?;

        tracing::info!("🔐 Senha {} criada para a service account {}", view.uuid, owner_uuid);
        Ok(IssuedPassword { view, secret })
    }

    pub async fn read_password(
        &self,
        tenant_uuid: Uuid,
        owner_uuid: Uuid,
        password_uuid: Uuid,
    ) -> Result<PasswordView, AppError> {
        self.store
            .read(|state| {
                owned_password(state, tenant_uuid, owner_uuid, password_uuid).map(PasswordView::from)
            })
            .await
    }

    pub async fn list_passwords(
        &self,
        tenant_uuid: Uuid,
        owner_uuid: Uuid,
    ) -> Result<Vec<PasswordView>, AppError> {
        self.store
            .read(|state| -> Result<_, AppError> {
                ensure_owner(state, tenant_uuid, OwnerType::ServiceAccount, owner_uuid)?;
                Ok(state
                    .passwords
                    .values()
                    .filter(|p| p.tenant_uuid == tenant_uuid && p.owner_uuid == owner_uuid)
                    .map(PasswordView::from)
                    .collect::<Vec<_>>())
            })
            .await
    }

    pub async fn delete_password(
        &self,
        tenant_uuid: Uuid,
        owner_uuid: Uuid,
        password_uuid: Uuid,
    ) -> Result<(), AppError> {
        self.store
            .write(|state| {
                owned_password(state, tenant_uuid, owner_uuid, password_uuid)?;
                let mut changes = ChangeSet::new();
                changes.delete(Password::key(password_uuid));
                Ok(((), changes))
            })
            .await
    }
}
