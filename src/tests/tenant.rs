use axum::http::StatusCode;
use serde_json::json;

use super::common::{uuid_of, TestApp};

#[tokio::test]
async fn create_read_list_tenant() {
    let app = TestApp::new();
    let tenant = app.tenant("acme").await;
    let tenant_uuid = uuid_of(&tenant);
    assert_eq!(tenant["identifier"], "acme");
    assert!(tenant["resource_version"].as_str().is_some());

    let (status, body) = app.get(&format!("/tenant/{}", tenant_uuid)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tenant"], tenant);

    let (status, body) = app.get("/tenant").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["uuids"], json!([tenant_uuid]));
    assert_eq!(body["data"]["tenants"][0], tenant);
}

#[tokio::test]
async fn numeric_identifier_is_accepted_as_text() {
    let app = TestApp::new();
    let (status, body) = app.post("/tenant", json!({ "identifier": 12345 })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["tenant"]["identifier"], "12345");
}

#[tokio::test]
async fn missing_or_duplicate_identifier_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app.post("/tenant", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    app.tenant("acme").await;
    let (status, _) = app.post("/tenant", json!({ "identifier": "acme" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = TestApp::new();
    let (status, _) = app
        .post("/tenant", json!({ "identifier": ["not", "a", "string"] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_or_invalid_tenant_is_not_found() {
    let app = TestApp::new();
    let (status, _) = app.get("/tenant/no-such").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .get("/tenant/6a1f2c55-6fb4-4b73-9c43-4a4bd0e9b2a1")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_requires_current_resource_version() {
    let app = TestApp::new();
    let tenant = app.tenant("acme").await;
    let uri = format!("/tenant/{}", uuid_of(&tenant));

    let (status, _) = app
        .put(&uri, json!({ "identifier": "acme2", "resource_version": "stale" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .put(
            &uri,
            json!({ "identifier": "acme2", "resource_version": tenant["resource_version"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let updated = &body["data"]["tenant"];
    assert_eq!(updated["identifier"], "acme2");
    assert_ne!(updated["resource_version"], tenant["resource_version"]);

    // A versão antiga não serve mais.
    let (status, _) = app
        .post(
            &uri,
            json!({ "identifier": "acme3", "resource_version": tenant["resource_version"] }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn update_of_missing_tenant_is_not_found_before_version_check() {
    let app = TestApp::new();
    let (status, _) = app
        .put(
            "/tenant/6a1f2c55-6fb4-4b73-9c43-4a4bd0e9b2a1",
            json!({ "identifier": "x", "resource_version": "whatever" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn privileged_create_uses_given_uuid() {
    let app = TestApp::new();
    let wanted = "0f5bd6c4-3b0e-4d0c-8d3b-2b0d3a7e9a10";
    let (status, body) = app
        .post(
            "/tenant/privileged",
            json!({ "uuid": wanted, "identifier": "acme" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["tenant"]["uuid"], wanted);

    let (status, _) = app
        .post(
            "/tenant/privileged",
            json!({ "uuid": wanted, "identifier": "other" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/tenant/privileged", json!({ "identifier": "no-uuid" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_cascades_to_everything_inside() {
    let app = TestApp::new();
    let tenant = app.tenant("acme").await;
    let tenant_uuid = uuid_of(&tenant);
    let other_uuid = uuid_of(&app.tenant("globex").await);
    let survivor = app
        .child(&other_uuid, "user", json!({ "identifier": "bob" }))
        .await;

    let project = app
        .child(&tenant_uuid, "project", json!({ "identifier": "web" }))
        .await;
    let user_uuid = uuid_of(
        &app.child(&tenant_uuid, "user", json!({ "identifier": "alice" }))
            .await,
    );
    let sa_uuid = uuid_of(
        &app.child(&tenant_uuid, "service_account", json!({ "identifier": "ci" }))
            .await,
    );
    let group = app
        .child(
            &tenant_uuid,
            "group",
            json!({ "identifier": "devs", "users": [user_uuid] }),
        )
        .await;
    let binding = app
        .child(
            &tenant_uuid,
            "role_binding",
            json!({ "users": [user_uuid], "service_accounts": [sa_uuid], "ttl": 600 }),
        )
        .await;
    let (_, body) = app
        .post(
            &format!("/tenant/{}/user/{}/multipass", tenant_uuid, user_uuid),
            json!({ "ttl": 600 }),
        )
        .await;
    let multipass_uuid = uuid_of(&body["data"]["multipass"]);
    let (_, body) = app
        .post(
            &format!("/tenant/{}/service_account/{}/password", tenant_uuid, sa_uuid),
            json!({ "ttl": 600 }),
        )
        .await;
    let password_uuid = uuid_of(&body["data"]["password"]);

    let (status, _) = app.delete(&format!("/tenant/{}", tenant_uuid)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let gone = [
        format!("/tenant/{}", tenant_uuid),
        format!("/tenant/{}/project/{}", tenant_uuid, uuid_of(&project)),
        format!("/tenant/{}/user/{}", tenant_uuid, user_uuid),
        format!("/tenant/{}/service_account/{}", tenant_uuid, sa_uuid),
        format!("/tenant/{}/group/{}", tenant_uuid, uuid_of(&group)),
        format!("/tenant/{}/role_binding/{}", tenant_uuid, uuid_of(&binding)),
        format!(
            "/tenant/{}/user/{}/multipass/{}",
            tenant_uuid, user_uuid, multipass_uuid
        ),
        format!(
            "/tenant/{}/service_account/{}/password/{}",
            tenant_uuid, sa_uuid, password_uuid
        ),
    ];
    for uri in &gone {
        let (status, _) = app.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
    }

    // O outro tenant não é tocado.
    let (_, body) = app.get("/tenant").await;
    assert_eq!(body["data"]["uuids"], json!([other_uuid]));
    let (status, _) = app
        .get(&format!("/tenant/{}/user/{}", other_uuid, uuid_of(&survivor)))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn rename_refreshes_full_identifiers() {
    let app = TestApp::new();
    let tenant = app.tenant("acme").await;
    let tenant_uuid = uuid_of(&tenant);
    let user = app
        .child(&tenant_uuid, "user", json!({ "identifier": "alice" }))
        .await;
    assert_eq!(user["full_identifier"], "alice@acme");

    app.put(
        &format!("/tenant/{}", tenant_uuid),
        json!({ "identifier": "globex", "resource_version": tenant["resource_version"] }),
    )
    .await;

    let (_, body) = app
        .get(&format!("/tenant/{}/user/{}", tenant_uuid, uuid_of(&user)))
        .await;
    assert_eq!(body["data"]["user"]["full_identifier"], "alice@globex");
}

#[tokio::test]
async fn feature_flag_binding_and_available_roles() {
    let app = TestApp::new();
    let tenant = app.tenant("acme").await;
    let tenant_uuid = uuid_of(&tenant);

    // Flag inexistente: 404.
    let (status, _) = app
        .root(
            axum::http::Method::POST,
            &format!("/tenant/{}/feature_flag/billing", tenant_uuid),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.post("/feature_flag", json!({ "name": "billing" })).await;
    app.post(
        "/role",
        json!({
            "name": "accountant",
            "description": "Vê as faturas",
            "require_one_of_feature_flags": ["billing"]
        }),
    )
    .await;
    app.post("/role", json!({ "name": "plain", "description": "Sem flag" }))
        .await;

    let (status, body) = app
        .root(
            axum::http::Method::POST,
            &format!("/tenant/{}/feature_flag/billing", tenant_uuid),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["tenant"]["feature_flags"],
        json!([{ "name": "billing", "enabled_for_new_projects": true }])
    );

    let (status, body) = app
        .get(&format!("/tenant/{}/available_roles", tenant_uuid))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["available_roles"],
        json!([{ "name": "accountant", "description": "Vê as faturas" }])
    );

    // Desligar duas vezes não é erro.
    for _ in 0..2 {
        let (status, body) = app
            .delete(&format!("/tenant/{}/feature_flag/billing", tenant_uuid))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tenant"]["feature_flags"], json!([]));
    }
}

#[tokio::test]
async fn concurrent_updates_with_same_version_have_one_winner() {
    let app = TestApp::new();
    let tenant = app.tenant("acme").await;
    let uri = format!("/tenant/{}", uuid_of(&tenant));
    let version = tenant["resource_version"].clone();

    let (first, second) = tokio::join!(
        app.put(&uri, json!({ "identifier": "globex", "resource_version": version })),
        app.put(&uri, json!({ "identifier": "initech", "resource_version": version })),
    );
    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);

    let winner = if first.0 == StatusCode::OK { first.1 } else { second.1 };
    let (_, body) = app.get(&uri).await;
    assert_eq!(body["data"]["tenant"], winner["data"]["tenant"]);
    assert_ne!(body["data"]["tenant"]["resource_version"], version);
}
