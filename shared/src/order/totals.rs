//! Order totals
//!
//! Uses rust_decimal for precise calculations, stores as f64.

use crate::models::OrderItem;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Rounding for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per product or order line (€1,000,000)
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per order line
pub const MAX_QUANTITY: i64 = 9999;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

#[inline]
fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `price × quantity`, rounded; `None` on overflow
pub fn line_subtotal(price: f64, quantity: i64) -> Option<f64> {
    to_decimal(price)
        .checked_mul(Decimal::from(quantity))
        .map(to_f64)
}

/// Computed money fields of an order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub product_discounts: f64,
    pub discount: f64,
    pub total: f64,
}

/// Compute subtotal, sale-price savings and grand total.
///
/// `pricing` returns the product's current `(regular_price, sale_price)`
/// when the product exists and has a sale price. The manual `discount` is a
/// flat amount and is not capped, so the total may go negative.
///
/// Returns `None` when an intermediate amount overflows.
pub fn calculate_totals<F>(items: &[OrderItem], discount: f64, pricing: F) -> Option<OrderTotals>
where
    F: Fn(i64) -> Option<(f64, f64)>,
{
    let mut subtotal = Decimal::ZERO;
    let mut product_discounts = Decimal::ZERO;

    for item in items {
        let quantity = Decimal::from(item.quantity);
        let line = to_decimal(item.price).checked_mul(quantity)?;
        subtotal = subtotal.checked_add(round_money(line))?;

        if let Some((regular, sale)) = pricing(item.product_id) {
            let saving = to_decimal(regular)
                .checked_sub(to_decimal(sale))?
                .checked_mul(quantity)?;
            product_discounts = product_discounts.checked_add(saving)?;
        }
    }

    let subtotal = round_money(subtotal);
    let product_discounts = round_money(product_discounts);
    let discount = round_money(to_decimal(discount));
    let total = subtotal
        .checked_sub(product_discounts)?
        .checked_sub(discount)?;

    Some(OrderTotals {
        subtotal: to_f64(subtotal),
        product_discounts: to_f64(product_discounts),
        discount: to_f64(discount),
        total: to_f64(total),
    })
}
