//! List and bulk response types

use serde::{Deserialize, Serialize};

/// Pagination metadata
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-based)
    pub page: u32,
    /// Items per page
    pub per_page: u32,
    /// Total number of items
    pub total: u64,
    /// Total number of pages
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(per_page as u64) as u32
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        Self {
            items,
            pagination: Pagination::new(page, per_page, total),
        }
    }
}

/// Outcome of a sequential bulk operation.
///
/// Operations are not transactional: each id is attempted independently and
/// failures are collected rather than aborting the batch.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulkResult {
    pub succeeded: u32,
    pub failed: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<BulkError>,
}

/// A single failed item of a bulk operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulkError {
    pub id: i64,
    pub message: String,
}

impl BulkResult {
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, id: i64, message: impl Into<String>) {
        self.failed += 1;
        self.errors.push(BulkError {
            id,
            message: message.into(),
        });
    }

    pub fn total(&self) -> u32 {
        self.succeeded + self.failed
    }
}
