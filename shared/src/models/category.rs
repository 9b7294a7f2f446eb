//! Category and Subcategory Models

use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
}

/// Subcategory entity, owned by a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubcategoryCreate {
    pub name: String,
    pub category_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubcategoryUpdate {
    pub name: Option<String>,
    pub category_id: Option<i64>,
}

/// Category with its subcategories, as listed by the admin UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTree {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<Subcategory>,
}
