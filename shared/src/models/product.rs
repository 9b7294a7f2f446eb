//! Product Model

use super::serde_helpers::{double_option, null_as_default};
use serde::{Deserialize, Serialize};

/// Product availability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProductStatus {
    #[default]
    Activo,
    Inactivo,
    Agotado,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activo => "Activo",
            Self::Inactivo => "Inactivo",
            Self::Agotado => "Agotado",
        }
    }

    /// Parse a status name, accepting Spanish and English spellings
    pub fn parse(value: &str) -> Option<Self> {
        match crate::util::fold_text(value).as_str() {
            "activo" | "active" => Some(Self::Activo),
            "inactivo" | "inactive" => Some(Self::Inactivo),
            "agotado" | "out_of_stock" | "sold_out" => Some(Self::Agotado),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub sale_price: Option<f64>,
    /// Category names (free text, matched against the categories table)
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subcategories: Vec<String>,
    pub brand: Option<String>,
    pub label: Option<String>,
    pub carousel_state: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub usage: Option<String>,
    pub ingredients: Option<String>,
    /// Ordered image URLs, first one is the cover
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub track_stock: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stock: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ProductStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Product {
    /// Tracked product with nothing left on the shelf
    pub fn is_out_of_stock(&self) -> bool {
        self.track_stock && self.stock <= 0
    }

    /// Sale price currently in effect, if any
    pub fn active_sale_price(&self) -> Option<f64> {
        self.sale_price
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Create product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: f64,
    pub sale_price: Option<f64>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub subcategories: Vec<String>,
    pub brand: Option<String>,
    pub label: Option<String>,
    pub carousel_state: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub usage: Option<String>,
    pub ingredients: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub track_stock: bool,
    #[serde(default)]
    pub stock: i64,
    pub status: Option<ProductStatus>,
}

impl ProductCreate {
    pub fn into_product(self, id: i64, now: i64) -> Product {
        Product {
            id,
            name: self.name.trim().to_string(),
            price: self.price,
            sale_price: self.sale_price,
            categories: self.categories,
            subcategories: self.subcategories,
            brand: crate::util::non_blank(self.brand),
            label: crate::util::non_blank(self.label),
            carousel_state: crate::util::non_blank(self.carousel_state),
            description: self.description,
            short_description: self.short_description,
            usage: self.usage,
            ingredients: self.ingredients,
            images: self.images,
            track_stock: self.track_stock,
            stock: self.stock,
            status: self.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Update product payload (partial)
///
/// Optional text fields are cleared by sending an empty string; the sale
/// price is cleared by sending `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub sale_price: Option<Option<f64>>,
    pub categories: Option<Vec<String>>,
    pub subcategories: Option<Vec<String>>,
    pub brand: Option<String>,
    pub label: Option<String>,
    pub carousel_state: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub usage: Option<String>,
    pub ingredients: Option<String>,
    pub images: Option<Vec<String>>,
    pub track_stock: Option<bool>,
    pub stock: Option<i64>,
    pub status: Option<ProductStatus>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.sale_price.is_none()
            && self.categories.is_none()
            && self.subcategories.is_none()
            && self.brand.is_none()
            && self.label.is_none()
            && self.carousel_state.is_none()
            && self.description.is_none()
            && self.short_description.is_none()
            && self.usage.is_none()
            && self.ingredients.is_none()
            && self.images.is_none()
            && self.track_stock.is_none()
            && self.stock.is_none()
            && self.status.is_none()
    }

    /// Apply the present fields onto `product`
    pub fn apply_to(&self, product: &mut Product) {
        use crate::util::non_blank;

        if let Some(name) = &self.name {
            product.name = name.trim().to_string();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(sale_price) = self.sale_price {
            product.sale_price = sale_price;
        }
        if let Some(categories) = &self.categories {
            product.categories = categories.clone();
        }
        if let Some(subcategories) = &self.subcategories {
            product.subcategories = subcategories.clone();
        }
        if let Some(brand) = &self.brand {
            product.brand = non_blank(Some(brand.clone()));
        }
        if let Some(label) = &self.label {
            product.label = non_blank(Some(label.clone()));
        }
        if let Some(carousel_state) = &self.carousel_state {
            product.carousel_state = non_blank(Some(carousel_state.clone()));
        }
        if let Some(description) = &self.description {
            product.description = non_blank(Some(description.clone()));
        }
        if let Some(short_description) = &self.short_description {
            product.short_description = non_blank(Some(short_description.clone()));
        }
        if let Some(usage) = &self.usage {
            product.usage = non_blank(Some(usage.clone()));
        }
        if let Some(ingredients) = &self.ingredients {
            product.ingredients = non_blank(Some(ingredients.clone()));
        }
        if let Some(images) = &self.images {
            product.images = images.clone();
        }
        if let Some(track_stock) = self.track_stock {
            product.track_stock = track_stock;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
    }
}

/// Bulk update payload: the same partial update applied to many products
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductBulkUpdate {
    pub ids: Vec<i64>,
    pub changes: ProductUpdate,
}

/// Bulk delete payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductBulkDelete {
    pub ids: Vec<i64>,
}

/// Suffix appended to the name of a duplicated product
pub const COPY_SUFFIX: &str = " (copia)";

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Product {
        ProductCreate {
            name: "Sérum Vitamina C".into(),
            price: 32.5,
            sale_price: Some(29.9),
            categories: vec!["Facial".into()],
            brand: Some("Isdin".into()),
            track_stock: true,
            stock: 4,
            ..Default::default()
        }
        .into_product(1, 100)
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(ProductStatus::parse("activo"), Some(ProductStatus::Activo));
        assert_eq!(ProductStatus::parse(" INACTIVE "), Some(ProductStatus::Inactivo));
        assert_eq!(ProductStatus::parse("Agotado"), Some(ProductStatus::Agotado));
        assert_eq!(ProductStatus::parse("borrador"), None);
    }

    #[test]
    fn test_create_defaults() {
        let p = sample();
        assert_eq!(p.status, ProductStatus::Activo);
        assert_eq!(p.created_at, 100);
        assert_eq!(p.updated_at, 100);
        assert!(p.label.is_none());
    }

    #[test]
    fn test_is_out_of_stock() {
        let mut p = sample();
        assert!(!p.is_out_of_stock());
        p.stock = 0;
        assert!(p.is_out_of_stock());
        p.track_stock = false;
        assert!(!p.is_out_of_stock());
    }

    #[test]
    fn test_update_clears_sale_price_and_brand() {
        let mut p = sample();
        let update: ProductUpdate =
            serde_json::from_str(r#"{"sale_price":null,"brand":"","stock":9}"#).unwrap();
        update.apply_to(&mut p);

        assert_eq!(p.sale_price, None);
        assert_eq!(p.brand, None);
        assert_eq!(p.stock, 9);
        assert_eq!(p.name, "Sérum Vitamina C");
    }

    #[test]
    fn test_update_absent_sale_price_is_kept() {
        let mut p = sample();
        let update: ProductUpdate = serde_json::from_str(r#"{"price":35.0}"#).unwrap();
        update.apply_to(&mut p);
        assert_eq!(p.sale_price, Some(29.9));
        assert_eq!(p.price, 35.0);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(ProductUpdate::default().is_empty());
        let update: ProductUpdate = serde_json::from_str(r#"{"sale_price":null}"#).unwrap();
        assert!(!update.is_empty());
    }

    #[test]
    fn test_row_with_nulls_deserializes() {
        let json = r#"{
            "id": 5, "name": "Agua micelar", "price": 12.0, "sale_price": null,
            "categories": null, "subcategories": null, "brand": null, "label": null,
            "carousel_state": null, "description": null, "short_description": null,
            "usage": null, "ingredients": null, "images": null, "track_stock": null,
            "stock": null, "status": "Inactivo", "created_at": 1, "updated_at": 2
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert!(p.categories.is_empty());
        assert!(!p.track_stock);
        assert_eq!(p.status, ProductStatus::Inactivo);
    }
}
