//! Product Image Model

use serde::{Deserialize, Serialize};

/// Image attached to a product
///
/// `storage_path` is set only for files uploaded through this service; images
/// referenced by external URL have no owned object to delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub url: String,
    pub storage_path: Option<String>,
    pub created_at: i64,
}

/// Remove-image payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImageRemove {
    pub url: String,
}
