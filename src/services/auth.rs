// src/services/auth.rs

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    common::{error::AppError, ids::unix_now},
    db::IamStore,
    models::{
        auth::{Caller, Claims, TokenKind},
        credential::Multipass,
    },
};

/// `jti` de um multipass: muda se o salt ou a geração mudarem.
pub fn multipass_jti(salt: &str, generation: u64) -> String {
    format!("{:x}", Sha256::digest(format!("{}:{}", salt, generation).as_bytes()))
}

#[derive(Clone)]
pub struct AuthService {
    store: IamStore,
    root_token: String,
    jwt_secret: String,
    issuer: String,
}

impl AuthService {
    pub fn new(store: IamStore, root_token: String, jwt_secret: String, issuer: String) -> Self {
        Self {
            store,
            root_token,
            jwt_secret,
            issuer,
        }
    }

    /// Token entregue uma única vez, na criação do multipass.
    pub fn issue_multipass_token(&self, multipass: &Multipass) -> Result<String, AppError> {
        let claims = Claims {
            sub: multipass.uuid.to_string(),
            iss: self.issuer.clone(),
            iat: Utc::now().timestamp() as usize,
            exp: multipass.valid_till as usize,
            jti: Some(multipass_jti(&multipass.salt, multipass.generation)),
            tenant_uuid: Some(multipass.tenant_uuid),
            kind: TokenKind::Multipass,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?;
        Ok(token)
    }

    /// Resolve quem está chamando. Qualquer token não reconhecido é 403.
    pub async fn authenticate(&self, token: &str) -> Result<Caller, AppError> {
        if token == self.root_token {
            return Ok(Caller::Root);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|e| {
            tracing::warn!("Token rejeitado: {}", e);
            AppError::Forbidden
        })?
        .claims;

        match claims.kind {
            TokenKind::Operator => Ok(match claims.tenant_uuid {
                None => Caller::Root,
                Some(tenant_uuid) => Caller::Tenant(tenant_uuid),
            }),
            TokenKind::Multipass => self.check_multipass(&claims).await,
        }
    }

    // O multipass precisa continuar existindo, válido, com o mesmo jti.
    async fn check_multipass(&self, claims: &Claims) -> Result<Caller, AppError> {
        let multipass_uuid = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Forbidden)?;
        let multipass = self
            .store
            .read(|state| state.multipasses.get(&multipass_uuid).cloned())
            .await
            .ok_or_else(|| {
                tracing::warn!("Multipass {} não existe mais", multipass_uuid);
                AppError::Forbidden
            })?;

        let expected_jti = multipass_jti(&multipass.salt, multipass.generation);
        if claims.jti.as_deref() != Some(expected_jti.as_str())
            || claims.tenant_uuid != Some(multipass.tenant_uuid)
            || multipass.valid_till <= unix_now()
        {
            tracing::warn!("Multipass {} rejeitado", multipass_uuid);
            return Err(AppError::Forbidden);
        }

        Ok(Caller::Tenant(multipass.tenant_uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::ids::new_uuid,
        db::ChangeSet,
        models::credential::OwnerType,
    };

    const SECRET: &str = "test-secret";

    fn service(store: IamStore) -> AuthService {
        AuthService::new(store, "root".into(), SECRET.into(), "iam-backend".into())
    }

    fn operator_token(tenant_uuid: Option<Uuid>, issuer: &str) -> String {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "operator".into(),
            iss: issuer.into(),
            iat: now,
            exp: now + 600,
            jti: None,
            tenant_uuid,
            kind: TokenKind::Operator,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_ref())).unwrap()
    }

    fn multipass(tenant_uuid: Uuid, ttl: i64) -> Multipass {
        Multipass {
            uuid: new_uuid(),
            tenant_uuid,
            owner_uuid: new_uuid(),
            owner_type: OwnerType::User,
            description: String::new(),
            ttl: ttl.max(0) as u64,
            max_ttl: 0,
            valid_till: unix_now() + ttl,
            allowed_cidrs: vec![],
            allowed_roles: vec![],
            salt: "salt".into(),
            generation: 0,
        }
    }

    async fn store_with(mp: &Multipass) -> IamStore {
        let store = IamStore::in_memory();
        let mp = mp.clone();
        store
            .write(move |_| {
                let mut changes = ChangeSet::new();
                changes.put(mp);
                Ok(((), changes))
            })
            .await
            .unwrap();
        store
    }

    #[test]
    fn jti_depends_on_salt_and_generation() {
        assert_eq!(multipass_jti("a", 0), multipass_jti("a", 0));
        assert_ne!(multipass_jti("a", 0), multipass_jti("a", 1));
        assert_ne!(multipass_jti("a", 0), multipass_jti("b", 0));
        assert_eq!(multipass_jti("a", 0).len(), 64);
    }

    #[tokio::test]
    async fn root_and_operator_tokens() {
        let auth = service(IamStore::in_memory());
        let tenant = new_uuid();

        assert_eq!(auth.authenticate("root").await.unwrap(), Caller::Root);
        assert_eq!(
            auth.authenticate(&operator_token(None, "iam-backend")).await.unwrap(),
            Caller::Root
        );
        assert_eq!(
            auth.authenticate(&operator_token(Some(tenant), "iam-backend"))
                .await
                .unwrap(),
            Caller::Tenant(tenant)
        );
    }

    #[tokio::test]
    async fn garbage_and_foreign_issuer_are_forbidden() {
        let auth = service(IamStore::in_memory());
        assert!(matches!(auth.authenticate("xxx").await, Err(AppError::Forbidden)));
        assert!(matches!(
            auth.authenticate(&operator_token(None, "someone-else")).await,
            Err(AppError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn multipass_token_lives_with_its_multipass() {
        let tenant = new_uuid();
        let mp = multipass(tenant, 600);
        let store = store_with(&mp).await;
        let auth = service(store.clone());

        let token = auth.issue_multipass_token(&mp).unwrap();
        assert_eq!(auth.authenticate(&token).await.unwrap(), Caller::Tenant(tenant));

        let id = mp.uuid;
        store
            .write(move |_| {
                let mut changes = ChangeSet::new();
                changes.delete(crate::db::ObjectKey::Multipass(id));
                Ok(((), changes))
            })
            .await
            .unwrap();
        assert!(matches!(auth.authenticate(&token).await, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn bumping_generation_invalidates_issued_tokens() {
        let tenant = new_uuid();
        let mp = multipass(tenant, 600);
        let store = store_with(&mp).await;
        let auth = service(store.clone());
        let token = auth.issue_multipass_token(&mp).unwrap();

        let mut rotated = mp.clone();
        rotated.generation += 1;
        let stored = rotated.clone();
        store
            .write(move |_| {
                let mut changes = ChangeSet::new();
                changes.put(stored);
                Ok(((), changes))
            })
            .await
            .unwrap();

        assert!(matches!(auth.authenticate(&token).await, Err(AppError::Forbidden)));
        let fresh = auth.issue_multipass_token(&rotated).unwrap();
        assert_eq!(auth.authenticate(&fresh).await.unwrap(), Caller::Tenant(tenant));
    }
}
