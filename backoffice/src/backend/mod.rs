//! Backend abstraction over the hosted table/storage/auth service
//!
//! Every call site depends on [`Backend`]; the concrete implementation is
//! chosen once at startup:
//!
//! - [`RemoteBackend`]: PostgREST-style REST tables, object storage and
//!   password auth over HTTP
//! - [`MemoryBackend`]: in-process fallback used when no backend URL is
//!   configured (development, tests)
//!
//! The trait works on JSON rows; typed access lives in
//! [`crate::db::repository`].

mod memory;
mod remote;
pub mod seed;

pub use memory::MemoryBackend;
pub use remote::RemoteBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Tables of the hosted service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Products,
    ProductImages,
    Categories,
    Subcategories,
    Brands,
    Labels,
    OrderStatuses,
    ProductCarouselStates,
    Orders,
    StoreSettings,
}

impl Table {
    pub const ALL: [Table; 10] = [
        Table::Products,
        Table::ProductImages,
        Table::Categories,
        Table::Subcategories,
        Table::Brands,
        Table::Labels,
        Table::OrderStatuses,
        Table::ProductCarouselStates,
        Table::Orders,
        Table::StoreSettings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::ProductImages => "product_images",
            Table::Categories => "categories",
            Table::Subcategories => "subcategories",
            Table::Brands => "brands",
            Table::Labels => "labels",
            Table::OrderStatuses => "order_statuses",
            Table::ProductCarouselStates => "product_carousel_states",
            Table::Orders => "orders",
            Table::StoreSettings => "store_settings",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality filter on a single column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub value: String,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }

    /// Row-level match used by the in-memory backend
    pub fn matches(&self, row: &Value) -> bool {
        match row.get(self.column) {
            Some(Value::String(s)) => *s == self.value,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == self.value,
        }
    }
}

/// Backend error types
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend request failed: {0}")]
    Transport(String),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid backend payload: {0}")]
    Decode(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Session is invalid or expired")]
    InvalidSession,
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Which implementation is serving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Remote,
    Memory,
}

/// Authenticated user as reported by the auth endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// Session returned by a password sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: i64,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Storage interface shared by the remote and in-memory backends
#[async_trait]
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    // ---- tables ----

    /// All rows of `table`, optionally restricted by an equality filter
    async fn select(&self, table: Table, filter: Option<&Filter>) -> BackendResult<Vec<Value>>;

    /// Insert one row and return it as stored
    async fn insert(&self, table: Table, row: Value) -> BackendResult<Value>;

    /// Patch the row with `id`; `None` when no such row exists
    async fn update(&self, table: Table, id: i64, patch: Value) -> BackendResult<Option<Value>>;

    /// Delete matching rows (all rows when `filter` is `None`), returning the count
    async fn delete(&self, table: Table, filter: Option<&Filter>) -> BackendResult<u64>;

    // ---- object storage ----

    async fn upload_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> BackendResult<()>;

    async fn remove_object(&self, path: &str) -> BackendResult<()>;

    /// Public URL under which an uploaded object is served
    fn public_url(&self, path: &str) -> String;

    // ---- auth ----

    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession>;

    async fn get_user(&self, access_token: &str) -> BackendResult<AuthUser>;

    async fn sign_out(&self, access_token: &str) -> BackendResult<()>;
}
