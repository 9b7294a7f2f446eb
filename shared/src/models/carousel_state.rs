//! Product Carousel State Model

use serde::{Deserialize, Serialize};

/// Carousel state: which storefront carousel/banner a product appears in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCarouselState {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCarouselStateCreate {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCarouselStateUpdate {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub color: Option<String>,
}
