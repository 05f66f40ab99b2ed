//! Boots the router on a random local port and exercises the surface that
//! needs no database: the banner, authentication rejections, and request
//! validation. Database-backed flows are covered by the service unit tests
//! and require a live PostgreSQL.

use serde_json::{json, Value};

async fn spawn_server() -> String {
    let port = portpicker::pick_unused_port().expect("no free port");
    let addr = format!("127.0.0.1:{}", port);

    let listener = tokio::net::TcpListener::bind(&addr).await.expect("bind test listener");
    let app = cafm_api::app();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn root_banner_lists_endpoints() {
    let base = spawn_server().await;

    let body: Value = reqwest::get(&base).await.unwrap().json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "CAFM API");
    assert!(body["data"]["endpoints"]["schools"].as_str().unwrap().contains("/api/schools"));
}

#[tokio::test]
async fn protected_routes_reject_missing_token() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    for path in [
        "/api/auth/whoami",
        "/api/schools",
        "/api/assets",
        "/api/reports",
        "/api/work-orders",
        "/api/attendance",
        "/api/notifications",
        "/api/stats",
        "/api/root/companies",
    ] {
        let resp = client.get(format!("{}{}", base, path)).send().await.unwrap();
        assert_eq!(resp.status(), 401, "expected 401 for {}", path);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn protected_routes_reject_garbage_token() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/schools", base))
        .header("authorization", "Bearer not.a.jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn non_bearer_authorization_is_rejected() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/schools", base))
        .header("authorization", "Basic dXNlcjpwdw==")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn login_requires_company_and_email() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/auth/login", base))
        .json(&json!({ "company": "", "email": "", "password": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn refresh_requires_bearer_token() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client.post(format!("{}/auth/refresh", base)).send().await.unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn unknown_routes_are_404() {
    let base = spawn_server().await;

    let resp = reqwest::get(format!("{}/api/not-a-thing", base)).await.unwrap();
    assert_eq!(resp.status(), 404);
}
