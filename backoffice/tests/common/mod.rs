//! In-process test harness: the full router over an in-memory backend

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use backoffice::{AppState, Config, api};

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub token: String,
    _work_dir: TempDir,
}

impl TestApp {
    /// Memory backend loaded with the fallback data set
    pub async fn seeded() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Memory backend with no rows at all
    pub async fn empty() -> Self {
        Self::with_config(|c| c.seed_fallback_data = false).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let work_dir = tempfile::tempdir().unwrap();
        let mut config = Config::for_work_dir(work_dir.path());
        customize(&mut config);

        let state = AppState::new(&config).await.unwrap();
        let app = api::build_app(&state).with_state(state.clone());

        let mut test_app = Self {
            app,
            state,
            token: String::new(),
            _work_dir: work_dir,
        };
        test_app.token = test_app.login("admin@localhost", "admin").await;
        test_app
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Send a JSON request; `token` of `None` sends no Authorization header
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(&self.token), None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(&self.token), Some(body))
            .await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(&self.token), Some(body))
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(&self.token), None).await
    }

    pub async fn delete_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(&self.token), Some(body))
            .await
    }

    /// Create a product and return its id
    pub async fn create_product(&self, body: Value) -> i64 {
        let (status, product) = self.post("/api/products", body).await;
        assert_eq!(status, StatusCode::OK, "{product}");
        product["id"].as_i64().unwrap()
    }

    pub async fn stock_of(&self, product_id: i64) -> i64 {
        let (status, product) = self.get(&format!("/api/products/{product_id}")).await;
        assert_eq!(status, StatusCode::OK, "{product}");
        product["stock"].as_i64().unwrap()
    }
}
