//! In-memory backend
//!
//! Fallback used when no hosted backend is configured. Rows live in
//! per-table vectors, uploaded objects in a map, and sessions are opaque
//! uuid tokens issued for the configured development credentials.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

use super::{
    AuthSession, AuthUser, Backend, BackendError, BackendKind, BackendResult, Filter, Table,
};
use shared::util::now_millis;

/// Session lifetime in seconds
const SESSION_TTL_SECS: i64 = 60 * 60 * 8;

#[derive(Debug, Clone)]
struct MemorySession {
    user: AuthUser,
    expires_at: i64,
}

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// In-process storage
#[derive(Debug)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<Table, Vec<Value>>>,
    objects: RwLock<HashMap<String, StoredObject>>,
    sessions: DashMap<String, MemorySession>,
    bucket: String,
    admin_email: String,
    admin_password: String,
}

impl MemoryBackend {
    pub fn new(bucket: &str, admin_email: &str, admin_password: &str) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            objects: RwLock::new(HashMap::new()),
            sessions: DashMap::new(),
            bucket: bucket.to_string(),
            admin_email: admin_email.to_string(),
            admin_password: admin_password.to_string(),
        }
    }

    /// Number of stored objects
    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }

    fn row_id(row: &Value) -> Option<i64> {
        row.get("id").and_then(Value::as_i64)
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn select(&self, table: Table, filter: Option<&Filter>) -> BackendResult<Vec<Value>> {
        let tables = self.tables.read();
        let rows = tables.get(&table).map(Vec::as_slice).unwrap_or_default();
        Ok(rows
            .iter()
            .filter(|row| filter.is_none_or(|f| f.matches(row)))
            .cloned()
            .collect())
    }

    async fn insert(&self, table: Table, row: Value) -> BackendResult<Value> {
        let id = Self::row_id(&row).ok_or_else(|| BackendError::Status {
            status: 400,
            message: format!("row for {table} has no numeric id"),
        })?;

        let mut tables = self.tables.write();
        let rows = tables.entry(table).or_default();
        if rows.iter().any(|r| Self::row_id(r) == Some(id)) {
            return Err(BackendError::Status {
                status: 409,
                message: format!("duplicate key id={id} in {table}"),
            });
        }
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, id: i64, patch: Value) -> BackendResult<Option<Value>> {
        let Value::Object(patch) = patch else {
            return Err(BackendError::Status {
                status: 400,
                message: "update payload must be an object".to_string(),
            });
        };

        let mut tables = self.tables.write();
        let Some(row) = tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|r| Self::row_id(r) == Some(id)))
        else {
            return Ok(None);
        };

        if let Value::Object(existing) = row {
            for (key, value) in patch {
                if key != "id" {
                    existing.insert(key, value);
                }
            }
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, table: Table, filter: Option<&Filter>) -> BackendResult<u64> {
        let mut tables = self.tables.write();
        let Some(rows) = tables.get_mut(&table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !filter.is_none_or(|f| f.matches(row)));
        Ok((before - rows.len()) as u64)
    }

    async fn upload_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> BackendResult<()> {
        self.objects.write().insert(
            path.trim_start_matches('/').to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn remove_object(&self, path: &str) -> BackendResult<()> {
        self.objects.write().remove(path.trim_start_matches('/'));
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "memory://{}/{}",
            self.bucket,
            path.trim_start_matches('/')
        )
    }

    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        if !email.trim().eq_ignore_ascii_case(&self.admin_email) || password != self.admin_password
        {
            return Err(BackendError::InvalidCredentials);
        }

        let now = now_millis();
        self.sessions.retain(|_, session| session.expires_at > now);

        let user = AuthUser {
            id: "memory-admin".to_string(),
            email: Some(self.admin_email.clone()),
        };
        let token = uuid::Uuid::new_v4().to_string();
        self.sessions.insert(
            token.clone(),
            MemorySession {
                user: user.clone(),
                expires_at: now + SESSION_TTL_SECS * 1000,
            },
        );

        Ok(AuthSession {
            access_token: token,
            token_type: "bearer".to_string(),
            expires_in: SESSION_TTL_SECS,
            user,
        })
    }

    async fn get_user(&self, access_token: &str) -> BackendResult<AuthUser> {
        let session = self
            .sessions
            .get(access_token)
            .map(|s| s.clone())
            .ok_or(BackendError::InvalidSession)?;

        if session.expires_at <= now_millis() {
            self.sessions.remove(access_token);
            return Err(BackendError::InvalidSession);
        }
        Ok(session.user)
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        self.sessions.remove(access_token);
        Ok(())
    }
}
