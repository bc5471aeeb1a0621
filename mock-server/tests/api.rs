use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, router, PanelState, Service, User};
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// The value under `result.data.json`.
async fn payload<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let mut envelope: Value = body_json(response).await;
    serde_json::from_value(envelope["result"]["data"]["json"].take()).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn mutation(procedure: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/trpc/{procedure}"))
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

const INSPECT_WEB: &str =
    "/api/trpc/projects.inspectService?input=%7B%22json%22%3A%7B%22projectName%22%3A%22demo%22%2C%22serviceName%22%3A%22web%22%7D%7D";

// --- queries ---

#[tokio::test]
async fn list_projects_and_services_is_seeded() {
    let resp = app()
        .oneshot(get("/api/trpc/projects.listProjectsAndServices"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let listing: Value = payload(resp).await;
    assert_eq!(listing["projects"][0]["name"], "demo");
    assert_eq!(listing["projects"][0]["createdAt"], "2024-01-01T00:00:00Z");
    let services: Vec<Service> = serde_json::from_value(listing["services"].clone()).unwrap();
    assert_eq!(services.len(), 2);
    assert!(services.iter().any(|s| s.name == "web" && s.service_type == "app"));
    assert!(services.iter().any(|s| s.name == "stack" && s.service_type == "compose"));
}

#[tokio::test]
async fn inspect_service_reads_query_input() {
    let resp = app().oneshot(get(INSPECT_WEB)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let service: Service = payload(resp).await;
    assert_eq!(service.project_name, "demo");
    assert_eq!(service.name, "web");
}

#[tokio::test]
async fn inspect_unknown_project_returns_404() {
    let resp = app()
        .oneshot(get(
            "/api/trpc/projects.inspectProject?input=%7B%22json%22%3A%7B%22projectName%22%3A%22nope%22%7D%7D",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"project nope not found");
}

#[tokio::test]
async fn inspect_without_input_returns_400() {
    let resp = app().oneshot(get("/api/trpc/projects.inspectService")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_user_hides_password() {
    let resp = app().oneshot(get("/api/trpc/auth.getUser")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user: Value = payload(resp).await;
    assert_eq!(user["email"], "admin@example.com");
    assert_eq!(user["admin"], true);
    assert!(user.get("password").is_none());
    assert!(!user["apiToken"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn system_stats_are_fully_populated() {
    let resp = app().oneshot(get("/api/trpc/monitor.getSystemStats")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let stats: Value = payload(resp).await;
    assert_eq!(stats["cpuInfo"]["count"], 4);
    assert_eq!(stats["diskInfo"]["totalGb"], "40.0");
    assert_eq!(stats["cpuInfo"]["loadavg"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn unknown_procedure_returns_404() {
    let resp = app().oneshot(get("/api/trpc/projects.nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app()
        .oneshot(mutation("services.mysql.deployService", r#"{"json":{}}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- auth ---

#[tokio::test]
async fn token_is_enforced_when_configured() {
    let db = Arc::new(RwLock::new(PanelState::seeded()));
    let app = router(db, Some("secret".to_string()));

    let resp = app.clone().oneshot(get("/api/trpc/auth.getUser")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let wrong = Request::builder()
        .uri("/api/trpc/auth.getUser")
        .header(http::header::AUTHORIZATION, "Bearer secret")
        .body(String::new())
        .unwrap();
    assert_eq!(app.clone().oneshot(wrong).await.unwrap().status(), StatusCode::UNAUTHORIZED);

    let right = Request::builder()
        .uri("/api/trpc/auth.getUser")
        .header(http::header::AUTHORIZATION, "secret")
        .body(String::new())
        .unwrap();
    assert_eq!(app.oneshot(right).await.unwrap().status(), StatusCode::OK);
}

// --- mutations ---

#[tokio::test]
async fn mutations_answer_with_null_payload() {
    let resp = app()
        .oneshot(mutation(
            "services.app.stopService",
            r#"{"json":{"projectName":"demo","serviceName":"web"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope, serde_json::json!({"result": {"data": {"json": null}}}));
}

#[tokio::test]
async fn create_service_conflicts_with_existing_name() {
    let resp = app()
        .oneshot(mutation(
            "services.app.createService",
            r#"{"json":{"projectName":"demo","serviceName":"web"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_service_requires_known_project() {
    let resp = app()
        .oneshot(mutation(
            "services.app.createService",
            r#"{"json":{"projectName":"ghost","serviceName":"api"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lifecycle_is_kind_specific() {
    let resp = app()
        .oneshot(mutation(
            "services.compose.deployService",
            r#"{"json":{"projectName":"demo","serviceName":"web"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_user_rejects_duplicates_and_missing_fields() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(mutation(
            "users.createUser",
            r#"{"json":{"email":"admin@example.com","password":"pw"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = app
        .oneshot(mutation("users.createUser", r#"{"json":{"email":"x@example.com"}}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- full service lifecycle ---

#[tokio::test]
async fn service_lifecycle() {
    let db = Arc::new(RwLock::new(PanelState::seeded()));
    let app = router(db.clone(), None);

    // create
    let resp = app
        .clone()
        .oneshot(mutation(
            "services.app.createService",
            r#"{"json":{"projectName":"demo","serviceName":"api","env":"PORT=80","source":{"type":"image","image":"ghcr.io/acme/api:1"},"deploy":{"replicas":2}}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    {
        let state = db.read().await;
        let api = state.services.iter().find(|s| s.name == "api").unwrap();
        assert_eq!(api.env, "PORT=80");
        assert_eq!(api.source.image, "ghcr.io/acme/api:1");
        assert_eq!(api.deploy.replicas, 2);
        assert!(!api.enabled);
    }

    let target = r#"{"json":{"projectName":"demo","serviceName":"api"}}"#;

    // deploy twice, once forced
    let forced = r#"{"json":{"projectName":"demo","serviceName":"api","forceRebuild":true}}"#;
    for body in [target, forced] {
        let resp = app.clone().oneshot(mutation("services.app.deployService", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // notes, auto-deploy, token rotation
    let old_token = db
        .read()
        .await
        .services
        .iter()
        .find(|s| s.name == "api")
        .unwrap()
        .token
        .clone();
    let resp = app
        .clone()
        .oneshot(mutation(
            "services.common.setName",
            r#"{"json":{"projectName":"demo","serviceName":"api","notes":"public API"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    for procedure in ["services.app.enableGithubDeploy", "services.app.refreshDeployToken"] {
        let resp = app.clone().oneshot(mutation(procedure, target)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
    {
        let state = db.read().await;
        let api = state.services.iter().find(|s| s.name == "api").unwrap();
        assert_eq!(api.deployments, 2);
        assert!(api.enabled);
        assert_eq!(api.notes, "public API");
        assert!(api.source.auto_deploy);
        assert_ne!(api.token, old_token);
    }

    // stop
    let resp = app.clone().oneshot(mutation("services.app.stopService", target)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!db.read().await.services.iter().find(|s| s.name == "api").unwrap().enabled);

    // destroy, then inspect is 404
    let resp = app.clone().oneshot(mutation("services.app.destroyService", target)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app
        .clone()
        .oneshot(get(
            "/api/trpc/projects.inspectService?input=%7B%22json%22%3A%7B%22projectName%22%3A%22demo%22%2C%22serviceName%22%3A%22api%22%7D%7D",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // destroying again is 404 too
    let resp = app.oneshot(mutation("services.app.destroyService", target)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn created_user_appears_in_state() {
    let db = Arc::new(RwLock::new(PanelState::seeded()));
    let app = router(db.clone(), None);

    let resp = app
        .oneshot(mutation(
            "users.createUser",
            r#"{"json":{"email":"dev@example.com","password":"hunter22","admin":false}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let state = db.read().await;
    let user: &User = state.users.iter().find(|u| u.email == "dev@example.com").unwrap();
    assert!(!user.admin);
    assert_eq!(user.password, "hunter22");
}
