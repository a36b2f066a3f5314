use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    common::identifier::IdentifierPolicy,
    config::{AppState, Config},
    db::IamStore,
    models::auth::{Claims, TokenKind},
    routes,
};

pub const ROOT_TOKEN: &str = "root-token-for-tests";
pub const JWT_SECRET: &str = "jwt-secret-for-tests";
pub const JWT_ISSUER: &str = "iam-backend-tests";

pub fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".to_string(),
        database_url: None,
        database_max_connections: 1,
        root_token: ROOT_TOKEN.to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_issuer: JWT_ISSUER.to_string(),
        identifier_policy: IdentifierPolicy::Lenient,
    }
}

pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::with_store(test_config(), IamStore::in_memory());
        Self {
            router: routes::app(state),
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.raw(request).await
    }

    pub async fn raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn root(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(method, uri, Some(ROOT_TOKEN), body).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.root(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.root(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.root(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.root(Method::DELETE, uri, None).await
    }

    /// Cria um tenant e devolve o objeto.
    pub async fn tenant(&self, identifier: &str) -> Value {
        let (status, body) = self.post("/tenant", json!({ "identifier": identifier })).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["tenant"].clone()
    }

    /// Cria um recurso dentro do tenant e devolve o objeto (`data.<singular>`).
    pub async fn child(&self, tenant_uuid: &str, resource: &str, body: Value) -> Value {
        let uri = format!("/tenant/{}/{}", tenant_uuid, resource);
        let (status, response) = self.post(&uri, body).await;
        assert_eq!(status, StatusCode::CREATED, "{}", response);
        response["data"][resource].clone()
    }
}

/// JWT de operador, assinado com a chave compartilhada dos testes.
pub fn operator_token(tenant_uuid: Option<Uuid>) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: "operator".to_string(),
        iss: JWT_ISSUER.to_string(),
        iat: now,
        exp: now + 600,
        jti: None,
        tenant_uuid,
        kind: TokenKind::Operator,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_ref()),
    )
    .unwrap()
}

pub fn uuid_of(object: &Value) -> String {
    object["uuid"].as_str().unwrap().to_string()
}
