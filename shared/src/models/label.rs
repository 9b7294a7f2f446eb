//! Label Model

use serde::{Deserialize, Serialize};

/// Product label (badge shown on the storefront card)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
    /// Hex color, e.g. `#ff6b6b`
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelCreate {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
}
