//! HTTP client for the hosted backend
//!
//! - tables: `{base}/rest/v1/{table}` (PostgREST query syntax)
//! - storage: `{base}/storage/v1/object/{bucket}/{path}`
//! - auth: `{base}/auth/v1/...`

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

use super::{
    AuthSession, AuthUser, Backend, BackendError, BackendKind, BackendResult, Filter, Table,
};

/// Remote backend speaking the hosted service's REST dialect
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl RemoteBackend {
    pub fn new(
        base_url: &str,
        service_key: &str,
        bucket: &str,
        timeout: Duration,
    ) -> BackendResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            bucket: bucket.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.as_str())
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            path.trim_start_matches('/')
        )
    }

    /// Attach the service credentials used for table and storage access
    fn service(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    fn filter_query(filter: Option<&Filter>) -> Vec<(String, String)> {
        match filter {
            Some(f) => vec![(f.column.to_string(), format!("eq.{}", f.value))],
            // PostgREST refuses unfiltered deletes; this matches every row
            None => vec![("id".to_string(), "not.is.null".to_string())],
        }
    }

    async fn handle_response(response: reqwest::Response) -> BackendResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        // Error bodies carry either `message` (tables) or `error_description` (auth)
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error_description"))
                    .or_else(|| v.get("msg"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or(text);
        Err(BackendError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn rows(response: reqwest::Response) -> BackendResult<Vec<Value>> {
        let response = Self::handle_response(response).await?;
        Ok(response.json::<Vec<Value>>().await?)
    }
}

#[async_trait]
impl Backend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn select(&self, table: Table, filter: Option<&Filter>) -> BackendResult<Vec<Value>> {
        let mut query = vec![("select".to_string(), "*".to_string())];
        if let Some(f) = filter {
            query.push((f.column.to_string(), format!("eq.{}", f.value)));
        }
        let response = self
            .service(self.client.get(self.table_url(table)))
            .query(&query)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn insert(&self, table: Table, row: Value) -> BackendResult<Value> {
        let response = self
            .service(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Decode(format!("insert into {table} returned no row")))
    }

    async fn update(&self, table: Table, id: i64, patch: Value) -> BackendResult<Option<Value>> {
        let response = self
            .service(self.client.patch(self.table_url(table)))
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{id}"))])
            .json(&patch)
            .send()
            .await?;
        Ok(Self::rows(response).await?.into_iter().next())
    }

    async fn delete(&self, table: Table, filter: Option<&Filter>) -> BackendResult<u64> {
        let response = self
            .service(self.client.delete(self.table_url(table)))
            .header("Prefer", "return=representation")
            .query(&Self::filter_query(filter))
            .send()
            .await?;
        Ok(Self::rows(response).await?.len() as u64)
    }

    async fn upload_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> BackendResult<()> {
        let response = self
            .service(self.client.post(self.object_url(path)))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        Self::handle_response(response).await?;
        Ok(())
    }

    async fn remove_object(&self, path: &str) -> BackendResult<()> {
        let response = self
            .service(self.client.delete(self.object_url(path)))
            .send()
            .await?;
        match Self::handle_response(response).await {
            Ok(_) => Ok(()),
            // Already gone
            Err(BackendError::Status { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            path.trim_start_matches('/')
        )
    }

    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        let response = self
            .client
            .post(format!("{}/auth/v1/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.service_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                Err(BackendError::InvalidCredentials)
            }
            _ => Ok(Self::handle_response(response)
                .await?
                .json::<AuthSession>()
                .await?),
        }
    }

    async fn get_user(&self, access_token: &str) -> BackendResult<AuthUser> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.service_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(BackendError::InvalidSession),
            _ => Ok(Self::handle_response(response)
                .await?
                .json::<AuthUser>()
                .await?),
        }
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let response = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.service_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        Self::handle_response(response).await?;
        Ok(())
    }
}
