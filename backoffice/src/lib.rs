//! Dermo-cosmetics store back-office service
//!
//! Admin HTTP API over a hosted table/storage/auth backend (or an in-memory
//! fallback): product catalog, orders with stock reconciliation, lookup
//! tables, store settings and admin preferences.

pub mod api;
pub mod auth;
pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod state;
pub mod utils;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use state::AppState;
