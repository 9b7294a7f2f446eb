//! Typed data access
//!
//! [`Repository`] maps the JSON rows of the backend onto the shared models.

pub mod repository;

pub use repository::{RepoError, RepoResult, Repository, TableRecord};
