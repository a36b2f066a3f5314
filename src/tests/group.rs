use axum::http::StatusCode;
use serde_json::json;

use super::common::{uuid_of, TestApp};

#[tokio::test]
async fn group_accepts_subjects_and_flat_lists() {
    let app = TestApp::new();
    let tenant_uuid = uuid_of(&app.tenant("acme").await);
    let alice = uuid_of(&app.child(&tenant_uuid, "user", json!({ "identifier": "alice" })).await);
    let ci = uuid_of(
        &app.child(&tenant_uuid, "service_account", json!({ "identifier": "ci" }))
            .await,
    );

    let group = app
        .child(
            &tenant_uuid,
            "group",
            json!({
                "identifier": "admins",
                "subjects": [{ "type": "user", "id": alice }],
                "users": [alice],
                "service_accounts": [ci]
            }),
        )
        .await;
    assert_eq!(group["full_identifier"], "admins@group.acme");
    assert_eq!(
        group["subjects"],
        json!([
            { "type": "user", "id": alice },
            { "type": "service_account", "id": ci }
        ])
    );
}

#[tokio::test]
async fn unknown_member_is_bad_request() {
    let app = TestApp::new();
    let tenant_uuid = uuid_of(&app.tenant("acme").await);
    let (status, _) = app
        .post(
            &format!("/tenant/{}/group", tenant_uuid),
            json!({
                "identifier": "admins",
                "users": ["6a1f2c55-6fb4-4b73-9c43-4a4bd0e9b2a1"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn members_from_another_tenant_are_rejected() {
    let app = TestApp::new();
    let acme = uuid_of(&app.tenant("acme").await);
    let globex = uuid_of(&app.tenant("globex").await);
    let bob = uuid_of(&app.child(&globex, "user", json!({ "identifier": "bob" })).await);

    let (status, _) = app
        .post(
            &format!("/tenant/{}/group", acme),
            json!({ "identifier": "admins", "users": [bob] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn nested_groups_and_removal() {
    let app = TestApp::new();
    let tenant_uuid = uuid_of(&app.tenant("acme").await);
    let inner = app
        .child(&tenant_uuid, "group", json!({ "identifier": "inner" }))
        .await;
    let outer = app
        .child(
            &tenant_uuid,
            "group",
            json!({ "identifier": "outer", "groups": [uuid_of(&inner)] }),
        )
        .await;
    let outer_uri = format!("/tenant/{}/group/{}", tenant_uuid, uuid_of(&outer));

    // Um grupo não entra em si mesmo.
    let (status, _) = app
        .put(
            &outer_uri,
            json!({
                "identifier": "outer",
                "groups": [uuid_of(&outer)],
                "resource_version": outer["resource_version"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.delete(&format!("/tenant/{}/group/{}", tenant_uuid, uuid_of(&inner)))
        .await;
    let (_, body) = app.get(&outer_uri).await;
    assert_eq!(body["data"]["group"]["subjects"], json!([]));
}
