use axum::http::{Method, StatusCode};
use serde_json::json;

use super::common::{uuid_of, TestApp};

#[tokio::test]
async fn project_lifecycle() {
    let app = TestApp::new();
    let tenant_uuid = uuid_of(&app.tenant("acme").await);
    let project = app
        .child(&tenant_uuid, "project", json!({ "identifier": "web" }))
        .await;
    let uri = format!("/tenant/{}/project/{}", tenant_uuid, uuid_of(&project));
    assert_eq!(project["tenant_uuid"], tenant_uuid.as_str());

    let (status, body) = app.get(&format!("/tenant/{}/project?list=true", tenant_uuid)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["uuids"], json!([uuid_of(&project)]));

    let (status, body) = app
        .post(
            &uri,
            json!({ "identifier": "api", "resource_version": project["resource_version"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["project"]["identifier"], "api");

    let (status, _) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn project_is_invisible_from_another_tenant() {
    let app = TestApp::new();
    let acme = uuid_of(&app.tenant("acme").await);
    let globex = uuid_of(&app.tenant("globex").await);
    let project = app
        .child(&acme, "project", json!({ "identifier": "web" }))
        .await;

    let (status, _) = app
        .get(&format!("/tenant/{}/project/{}", globex, uuid_of(&project)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn project_identifier_is_unique_per_tenant() {
    let app = TestApp::new();
    let acme = uuid_of(&app.tenant("acme").await);
    let globex = uuid_of(&app.tenant("globex").await);
    app.child(&acme, "project", json!({ "identifier": "web" })).await;

    let (status, _) = app
        .post(&format!("/tenant/{}/project", acme), json!({ "identifier": "web" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Outro tenant pode repetir.
    app.child(&globex, "project", json!({ "identifier": "web" })).await;
}

#[tokio::test]
async fn project_in_missing_tenant_is_not_found() {
    let app = TestApp::new();
    let (status, _) = app
        .post(
            "/tenant/6a1f2c55-6fb4-4b73-9c43-4a4bd0e9b2a1/project",
            json!({ "identifier": "web" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn new_projects_inherit_enabled_tenant_flags() {
    let app = TestApp::new();
    let tenant_uuid = uuid_of(&app.tenant("acme").await);
    app.post("/feature_flag", json!({ "name": "billing" })).await;
    app.post("/feature_flag", json!({ "name": "beta" })).await;
    app.root(
        Method::POST,
        &format!("/tenant/{}/feature_flag/billing", tenant_uuid),
        None,
    )
    .await;
    app.post(
        &format!("/tenant/{}/feature_flag/beta", tenant_uuid),
        json!({ "enabled_for_new_projects": false }),
    )
    .await;

    let project = app
        .child(&tenant_uuid, "project", json!({ "identifier": "web" }))
        .await;
    assert_eq!(project["feature_flags"], json!(["billing"]));

    let flag_uri = format!(
        "/tenant/{}/project/{}/feature_flag/beta",
        tenant_uuid,
        uuid_of(&project)
    );
    let (status, body) = app.root(Method::POST, &flag_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["project"]["feature_flags"], json!(["billing", "beta"]));

    let (status, body) = app.delete(&flag_uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["project"]["feature_flags"], json!(["billing"]));
}
