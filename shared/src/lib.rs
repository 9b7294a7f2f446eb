//! Shared types for the dermo back-office
//!
//! Domain models, the unified error system, pagination types and the pure
//! domain logic (order totals, stock reconciliation, product filtering and
//! CSV import/export) used by the service crate.

pub mod catalog;
pub mod error;
pub mod models;
pub mod order;
pub mod response;
pub mod util;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use response::{BulkResult, PaginatedResponse, Pagination};
