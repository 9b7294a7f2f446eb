//! Error system shared by every crate
//!
//! Handlers return [`AppResult`]; an [`AppError`] renders as the
//! [`ApiResponse`] body with the HTTP status of its [`ErrorCode`].

mod codes;
mod types;

pub use codes::{ErrorCategory, ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
