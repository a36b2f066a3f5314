use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::json;

use super::common::{operator_token, uuid_of, TestApp, ROOT_TOKEN};

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, _) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_token_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/tenant", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_token_is_forbidden() {
    let app = TestApp::new();
    let (status, _) = app.send(Method::GET, "/tenant", Some("xxx"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::POST,
            "/tenant",
            Some("xxx"),
            Some(json!({ "identifier": "acme" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn vault_token_header_is_accepted() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/tenant")
        .header("X-Vault-Token", ROOT_TOKEN)
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.raw(request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn root_operator_token_acts_as_root() {
    let app = TestApp::new();
    let token = operator_token(None);
    let (status, _) = app
        .send(
            Method::POST,
            "/tenant",
            Some(&token),
            Some(json!({ "identifier": "acme" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn tenant_token_is_confined_to_its_tenant() {
    let app = TestApp::new();
    let acme = uuid_of(&app.tenant("acme").await);
    let globex = uuid_of(&app.tenant("globex").await);
    let token = operator_token(Some(acme.parse().unwrap()));

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/tenant/{}/user", acme),
            Some(&token),
            Some(json!({ "identifier": "alice" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .send(Method::GET, &format!("/tenant/{}/user", globex), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Rotas globais de tenant são só do root.
    let (status, _) = app.send(Method::GET, "/tenant", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .send(Method::DELETE, &format!("/tenant/{}", acme), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/tenant"].is_object());
}

#[tokio::test]
async fn every_operation_checks_the_token() {
    let app = TestApp::new();
    let tenant_uuid = uuid_of(&app.tenant("acme").await);
    let user_uuid = uuid_of(
        &app.child(&tenant_uuid, "user", json!({ "identifier": "alice" }))
            .await,
    );
    let (_, body) = app
        .post(
            &format!("/tenant/{}/user/{}/multipass", tenant_uuid, user_uuid),
            json!({ "ttl": 600 }),
        )
        .await;
    let multipass_uuid = uuid_of(&body["data"]["multipass"]);

    let users = format!("/tenant/{}/user", tenant_uuid);
    let user = format!("{}/{}", users, user_uuid);
    let multipasses = format!("{}/multipass", user);
    let multipass = format!("{}/{}", multipasses, multipass_uuid);
    let operations = [
        (Method::POST, users.clone(), Some(json!({ "identifier": "bob" }))),
        (Method::GET, users.clone(), None),
        (Method::GET, user.clone(), None),
        (Method::PUT, user.clone(), Some(json!({ "identifier": "carol" }))),
        (Method::DELETE, user.clone(), None),
        (Method::POST, multipasses.clone(), Some(json!({ "ttl": 60 }))),
        (Method::GET, multipasses.clone(), None),
        (Method::GET, multipass.clone(), None),
        (Method::PUT, multipass.clone(), Some(json!({ "ttl": 60 }))),
        (Method::DELETE, multipass.clone(), None),
    ];

    for (method, uri, body) in &operations {
        let (status, _) = app.send(method.clone(), uri, None, body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {} sem token", method, uri);

        let (status, _) = app
            .send(method.clone(), uri, Some("xxx"), body.clone())
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {} com token inválido", method, uri);
    }

    // Nada foi alterado pelas chamadas recusadas.
    let (status, body) = app.get(&multipass).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["multipass"]["uuid"], multipass_uuid);
    let (_, body) = app.get(&users).await;
    assert_eq!(body["data"]["uuids"], json!([user_uuid]));
}
