mod common;

use common::TestApp;
use http::{Method, StatusCode};

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::seeded().await;
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "memory");
    assert_eq!(body["products"], 4);
}

#[tokio::test]
async fn test_api_requires_token() {
    let app = TestApp::seeded().await;

    let (status, body) = app
        .request(Method::GET, "/api/products", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);

    let (status, body) = app
        .request(Method::GET, "/api/products", Some("not-a-session"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = TestApp::seeded().await;
    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(serde_json::json!({ "email": "admin@localhost", "password": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);
}

#[tokio::test]
async fn test_me_and_logout() {
    let app = TestApp::seeded().await;

    let (status, me) = app.get("/api/auth/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "admin@localhost");
    assert!(me.get("token").is_none());

    let (status, _) = app
        .request(Method::POST, "/api/auth/logout", Some(&app.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/auth/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_routes_are_json_404() {
    let app = TestApp::seeded().await;

    let (status, body) = app.request(Method::GET, "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 3);

    let (status, body) = app.get("/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 3);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::seeded().await;
    let response = tower::ServiceExt::oneshot(
        app.app.clone(),
        http::Request::builder()
            .uri("/health")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
