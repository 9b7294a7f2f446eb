//! Order bookkeeping
//!
//! Pure functions over order line items: money totals and the stock
//! reservation deltas applied when an order is created, edited, cancelled
//! or deleted.

pub mod stock;
pub mod totals;

pub use stock::{
    Reservation, Shortfall, StockAdjustment, apply_delta, available_stock, find_shortfalls,
    plan_adjustments, stock_deltas,
};
pub use totals::{
    MAX_PRICE, MAX_QUANTITY, OrderTotals, calculate_totals, line_subtotal, to_decimal, to_f64,
};
