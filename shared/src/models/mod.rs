//! Data models
//!
//! Row types of the hosted tables plus their create/update payloads.
//! All IDs are `i64` snowflake ids, timestamps are epoch milliseconds.

pub mod brand;
pub mod carousel_state;
pub mod category;
pub mod label;
pub mod order;
pub mod order_status;
pub mod preferences;
pub mod product;
pub mod product_image;
pub mod serde_helpers;
pub mod store_settings;

// Re-exports
pub use brand::*;
pub use carousel_state::*;
pub use category::*;
pub use label::*;
pub use order::*;
pub use order_status::*;
pub use preferences::*;
pub use product::*;
pub use product_image::*;
pub use store_settings::*;
