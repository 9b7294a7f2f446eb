//! Service-layer errors
//!
//! Services return [`ServiceResult`]; `?` works on backend, repository and
//! business errors alike. Infrastructure failures are logged and reach the
//! client only as a generic `DatabaseError`.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::backend::BackendError;
use crate::db::RepoError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Backend, storage or IO failure
    #[error("backend error: {0}")]
    Db(BoxError),
    /// Business-rule error, sent to the client as is
    #[error("{}: {}", .0.code, .0.message)]
    App(#[from] AppError),
}

impl From<BackendError> for ServiceError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::InvalidCredentials => ServiceError::App(AppError::invalid_credentials()),
            BackendError::InvalidSession => {
                ServiceError::App(AppError::new(ErrorCode::TokenInvalid))
            }
            BackendError::Transport(message) => {
                tracing::warn!(error = %message, "Backend unreachable");
                ServiceError::App(AppError::network("Backend service is unreachable"))
            }
            other => ServiceError::Db(other.into()),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(what) => ServiceError::App(AppError::not_found(what)),
            RepoError::Backend(b) => b.into(),
            decode @ RepoError::Decode { .. } => ServiceError::Db(decode.into()),
        }
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(err) => err,
            ServiceError::Db(err) => {
                tracing::error!(error = %err, "Backend call failed");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        AppError::from(self).into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_auth_errors_become_app_errors() {
        let err: AppError = ServiceError::from(BackendError::InvalidCredentials).into();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);

        let err: AppError = ServiceError::from(BackendError::InvalidSession).into();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_transport_error_is_network_error() {
        let err: AppError =
            ServiceError::from(BackendError::Transport("connection refused".into())).into();
        assert_eq!(err.code, ErrorCode::NetworkError);
    }

    #[test]
    fn test_status_error_is_hidden_behind_database_error() {
        let err: AppError = ServiceError::from(BackendError::Status {
            status: 500,
            message: "relation does not exist".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Backend storage error");
    }

    #[test]
    fn test_repo_not_found() {
        let err: AppError = ServiceError::from(RepoError::NotFound("orders:1".into())).into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
