//! Authentication: bearer-token check against the backend's auth service
//!
//! - [`require_auth`] - middleware guarding `/api/*`
//! - [`CurrentUser`] - user context injected into request extensions

pub mod middleware;

pub use middleware::{CurrentUser, require_auth};
