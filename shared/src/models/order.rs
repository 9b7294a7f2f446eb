//! Order Model

use super::serde_helpers::null_as_default;
use serde::{Deserialize, Serialize};

/// Status name of orders that hold no stock
pub const CANCELLED_STATUS: &str = "Cancelado";
/// Preferred status for new orders
pub const DEFAULT_ORDER_STATUS: &str = "Pendiente";
/// Number given to the first order of an empty store
pub const FIRST_ORDER_NUMBER: i64 = 1001;

/// Whether an order in `status` keeps its quantities reserved
pub fn status_holds_stock(status: &str) -> bool {
    !status.trim().eq_ignore_ascii_case(CANCELLED_STATUS)
}

/// Order line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    pub name: String,
    pub image: Option<String>,
    pub quantity: i64,
    /// Unit price (regular price of the product)
    pub price: f64,
    pub subtotal: f64,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: i64,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    /// Manual flat discount
    #[serde(default, deserialize_with = "null_as_default")]
    pub discount: f64,
    /// Sum of sale-price savings over the items
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_discounts: f64,
    pub total: f64,
    /// Status name (denormalized from order_statuses)
    pub status: String,
    pub status_id: Option<i64>,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn holds_stock(&self) -> bool {
        status_holds_stock(&self.status)
    }
}

/// Line item as submitted by the order form
///
/// Name, image and price default from the product when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub product_id: i64,
    pub quantity: i64,
    pub name: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
}

/// Create order payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderCreate {
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub discount: f64,
    pub status_id: Option<i64>,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
}

/// Update order payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub items: Option<Vec<OrderItemInput>>,
    pub discount: Option<f64>,
    pub status_id: Option<i64>,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
}

/// Status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChange {
    pub status_id: i64,
}

/// Available stock for one product while editing an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableStock {
    pub product_id: i64,
    pub track_stock: bool,
    /// Current stock plus what the order already reserves
    pub available: i64,
}
