use axum::http::{Method, StatusCode};
use serde_json::json;

use super::common::{operator_token, uuid_of, TestApp};

#[tokio::test]
async fn role_lifecycle() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/role",
            json!({ "name": "viewer", "description": "Leitura", "scope": "project" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"]["scope"], "project");

    let (status, _) = app.post("/role", json!({ "name": "viewer" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/role").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["names"], json!(["viewer"]));

    // Sem `scope` no corpo, o escopo atual é mantido.
    let (status, body) = app
        .put("/role/viewer", json!({ "description": "Só leitura" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"]["scope"], "project");
    assert_eq!(body["data"]["role"]["description"], "Só leitura");

    let (status, _) = app.delete("/role/viewer").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get("/role/viewer").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn include_and_exclude() {
    let app = TestApp::new();
    app.post("/role", json!({ "name": "admin" })).await;
    app.post("/role", json!({ "name": "viewer" })).await;

    let (status, body) = app
        .root(Method::POST, "/role/admin/include/viewer", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["role"]["included_roles"],
        json!([{ "name": "viewer", "options_template": "" }])
    );

    let (status, _) = app.root(Method::POST, "/role/admin/include/admin", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.root(Method::POST, "/role/admin/include/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Incluída por outra role: não pode sair.
    let (status, _) = app.delete("/role/viewer").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.delete("/role/admin/include/viewer").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"]["included_roles"], json!([]));
    let (status, _) = app.delete("/role/admin/include/viewer").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn role_in_use_by_binding_cannot_be_deleted() {
    let app = TestApp::new();
    let tenant_uuid = uuid_of(&app.tenant("acme").await);
    app.post("/role", json!({ "name": "viewer" })).await;
    app.child(
        &tenant_uuid,
        "role_binding",
        json!({ "roles": [{ "name": "viewer" }], "ttl": 60 }),
    )
    .await;

    let (status, _) = app.delete("/role/viewer").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn tenant_callers_read_but_do_not_write_roles() {
    let app = TestApp::new();
    let tenant_uuid = uuid_of(&app.tenant("acme").await);
    app.post("/role", json!({ "name": "viewer" })).await;
    let token = operator_token(Some(tenant_uuid.parse().unwrap()));

    let (status, _) = app.send(Method::GET, "/role/viewer", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(Method::POST, "/role", Some(&token), Some(json!({ "name": "x" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
