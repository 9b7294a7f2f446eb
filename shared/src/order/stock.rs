//! Stock reservation bookkeeping
//!
//! An order reserves the quantities of its line items while its status holds
//! stock (anything but `Cancelado`). Creating, editing, cancelling or
//! deleting an order moves stock by the difference between what the order
//! reserved before and what it reserves after.

use crate::models::{OrderItem, status_holds_stock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Line items plus the status deciding whether they are reserved
#[derive(Debug, Clone, Copy)]
pub struct Reservation<'a> {
    pub items: &'a [OrderItem],
    pub status: &'a str,
}

impl<'a> Reservation<'a> {
    pub fn new(items: &'a [OrderItem], status: &'a str) -> Self {
        Self { items, status }
    }

    pub fn holds_stock(&self) -> bool {
        status_holds_stock(self.status)
    }

    /// Reserved quantity per product; repeated lines are summed.
    /// Empty when the status holds no stock.
    pub fn held(&self) -> HashMap<i64, i64> {
        let mut held = HashMap::new();
        if !self.holds_stock() {
            return held;
        }
        for item in self.items {
            let qty = held.entry(item.product_id).or_insert(0_i64);
            *qty = qty.saturating_add(item.quantity);
        }
        held
    }

    pub fn held_for(&self, product_id: i64) -> i64 {
        if !self.holds_stock() {
            return 0;
        }
        self.items
            .iter()
            .filter(|i| i.product_id == product_id)
            .fold(0_i64, |acc, i| acc.saturating_add(i.quantity))
    }
}

/// Signed stock delta per product: `held(before) − held(after)`.
///
/// `before` is `None` on creation, `after` is `None` on deletion. Products
/// whose reservation does not change are omitted.
pub fn stock_deltas(
    before: Option<Reservation<'_>>,
    after: Option<Reservation<'_>>,
) -> BTreeMap<i64, i64> {
    let held_before = before.map(|r| r.held()).unwrap_or_default();
    let held_after = after.map(|r| r.held()).unwrap_or_default();

    let mut deltas = BTreeMap::new();
    for (&product_id, &qty) in &held_before {
        let delta = deltas.entry(product_id).or_insert(0_i64);
        *delta = delta.saturating_add(qty);
    }
    for (&product_id, &qty) in &held_after {
        let delta = deltas.entry(product_id).or_insert(0_i64);
        *delta = delta.saturating_sub(qty);
    }
    deltas.retain(|_, delta| *delta != 0);
    deltas
}

/// New stock after applying `delta`, floored at zero
#[inline]
pub fn apply_delta(stock: i64, delta: i64) -> i64 {
    stock.saturating_add(delta).max(0)
}

/// Stock the order form may allocate: current stock plus what the original
/// order already reserves for the product.
pub fn available_stock(
    current_stock: i64,
    product_id: i64,
    original: Option<Reservation<'_>>,
) -> i64 {
    current_stock.saturating_add(original.map_or(0, |r| r.held_for(product_id)))
}

/// A stock write to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub product_id: i64,
    pub before: i64,
    pub after: i64,
}

/// Turn deltas into concrete stock writes.
///
/// `lookup` returns `(track_stock, current_stock)`; products that are
/// missing or untracked are skipped.
pub fn plan_adjustments<F>(deltas: &BTreeMap<i64, i64>, lookup: F) -> Vec<StockAdjustment>
where
    F: Fn(i64) -> Option<(bool, i64)>,
{
    deltas
        .iter()
        .filter_map(|(&product_id, &delta)| {
            let (track_stock, stock) = lookup(product_id)?;
            if !track_stock {
                return None;
            }
            Some(StockAdjustment {
                product_id,
                before: stock,
                after: apply_delta(stock, delta),
            })
        })
        .filter(|adj| adj.before != adj.after)
        .collect()
}

/// Requested quantity above what is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub product_id: i64,
    pub requested: i64,
    pub available: i64,
}

/// Products whose new reservation exceeds available stock.
///
/// Only consulted when overselling is rejected; the default behavior floors
/// stock at zero instead.
pub fn find_shortfalls<F>(
    before: Option<Reservation<'_>>,
    after: Reservation<'_>,
    lookup: F,
) -> Vec<Shortfall>
where
    F: Fn(i64) -> Option<(bool, i64)>,
{
    let mut requested: Vec<(i64, i64)> = after.held().into_iter().collect();
    requested.sort_unstable();

    requested
        .into_iter()
        .filter_map(|(product_id, qty)| {
            let (track_stock, stock) = lookup(product_id)?;
            if !track_stock {
                return None;
            }
            let available = available_stock(stock, product_id, before);
            (qty > available).then_some(Shortfall {
                product_id,
                requested: qty,
                available,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i64, quantity: i64) -> OrderItem {
        OrderItem {
            product_id,
            name: String::new(),
            image: None,
            quantity,
            price: 1.0,
            subtotal: quantity as f64,
        }
    }

    fn apply(
        stock: &mut HashMap<i64, (bool, i64)>,
        before: Option<Reservation<'_>>,
        after: Option<Reservation<'_>>,
    ) {
        let deltas = stock_deltas(before, after);
        let snapshot = stock.clone();
        for adj in plan_adjustments(&deltas, |id| snapshot.get(&id).copied()) {
            stock.get_mut(&adj.product_id).unwrap().1 = adj.after;
        }
    }

    #[test]
    fn test_creation_decrements_floored_at_zero() {
        let mut stock = HashMap::from([(1, (true, 10)), (2, (true, 1))]);
        let items = vec![line(1, 3), line(2, 5)];

        apply(&mut stock, None, Some(Reservation::new(&items, "Pendiente")));

        assert_eq!(stock[&1].1, 7);
        assert_eq!(stock[&2].1, 0);
    }

    #[test]
    fn test_untracked_and_missing_products_are_skipped() {
        let mut stock = HashMap::from([(1, (false, 10))]);
        let items = vec![line(1, 3), line(99, 5)];

        let deltas = stock_deltas(None, Some(Reservation::new(&items, "Pendiente")));
        assert_eq!(deltas.len(), 2);
        let snapshot = stock.clone();
        assert!(plan_adjustments(&deltas, |id| snapshot.get(&id).copied()).is_empty());

        apply(&mut stock, None, Some(Reservation::new(&items, "Pendiente")));
        assert_eq!(stock[&1].1, 10);
    }

    #[test]
    fn test_edit_matches_original_plus_old_minus_new() {
        // Original stock after the order was placed
        let original_stock = HashMap::from([(1, 8_i64), (2, 5), (3, 4)]);
        let old_items = vec![line(1, 2), line(2, 3)];
        let new_items = vec![line(1, 5), line(3, 1), line(1, 1)];

        let mut stock: HashMap<i64, (bool, i64)> =
            original_stock.iter().map(|(&k, &v)| (k, (true, v))).collect();
        apply(
            &mut stock,
            Some(Reservation::new(&old_items, "Confirmado")),
            Some(Reservation::new(&new_items, "Confirmado")),
        );

        let qty = |items: &[OrderItem], id: i64| {
            items
                .iter()
                .filter(|i| i.product_id == id)
                .map(|i| i.quantity)
                .sum::<i64>()
        };
        for id in [1, 2, 3] {
            let expected = (original_stock[&id] + qty(&old_items, id) - qty(&new_items, id)).max(0);
            assert_eq!(stock[&id].1, expected, "product {id}");
        }
    }

    #[test]
    fn test_cancelling_restores_and_uncancelling_deducts() {
        let mut stock = HashMap::from([(1, (true, 4))]);
        let items = vec![line(1, 3)];

        apply(
            &mut stock,
            Some(Reservation::new(&items, "Pendiente")),
            Some(Reservation::new(&items, "Cancelado")),
        );
        assert_eq!(stock[&1].1, 7);

        apply(
            &mut stock,
            Some(Reservation::new(&items, "Cancelado")),
            Some(Reservation::new(&items, "Enviado")),
        );
        assert_eq!(stock[&1].1, 4);
    }

    #[test]
    fn test_editing_cancelled_order_moves_nothing() {
        let old_items = vec![line(1, 2)];
        let new_items = vec![line(1, 6)];
        let deltas = stock_deltas(
            Some(Reservation::new(&old_items, "Cancelado")),
            Some(Reservation::new(&new_items, "cancelado")),
        );
        assert!(deltas.is_empty());
    }

    #[test]
    fn test_deleting_order_restores_stock() {
        let mut stock = HashMap::from([(1, (true, 0))]);
        let items = vec![line(1, 2), line(1, 1)];
        apply(&mut stock, Some(Reservation::new(&items, "Pendiente")), None);
        assert_eq!(stock[&1].1, 3);
    }

    #[test]
    fn test_available_stock() {
        let items = vec![line(1, 2), line(2, 1), line(1, 1)];

        let held = Reservation::new(&items, "Pendiente");
        assert_eq!(available_stock(5, 1, Some(held)), 8);
        assert_eq!(available_stock(5, 3, Some(held)), 5);

        let cancelled = Reservation::new(&items, "Cancelado");
        assert_eq!(available_stock(5, 1, Some(cancelled)), 5);

        assert_eq!(available_stock(5, 1, None), 5);
    }

    #[test]
    fn test_apply_delta_floor() {
        assert_eq!(apply_delta(3, -5), 0);
        assert_eq!(apply_delta(3, 2), 5);
        assert_eq!(apply_delta(0, 0), 0);
    }

    #[test]
    fn test_huge_quantities_saturate() {
        let items = vec![line(1, i64::MAX), line(1, i64::MAX)];
        let held = Reservation::new(&items, "Pendiente");

        assert_eq!(held.held()[&1], i64::MAX);
        assert_eq!(held.held_for(1), i64::MAX);
        assert_eq!(available_stock(5, 1, Some(held)), i64::MAX);

        let deltas = stock_deltas(None, Some(held));
        assert_eq!(deltas[&1], -i64::MAX);
        assert_eq!(apply_delta(5, deltas[&1]), 0);
    }

    #[test]
    fn test_find_shortfalls() {
        let stock = HashMap::from([(1, (true, 2)), (2, (false, 0)), (3, (true, 10))]);
        let old_items = vec![line(1, 1)];
        let new_items = vec![line(1, 4), line(2, 50), line(3, 10)];

        let shortfalls = find_shortfalls(
            Some(Reservation::new(&old_items, "Pendiente")),
            Reservation::new(&new_items, "Pendiente"),
            |id| stock.get(&id).copied(),
        );

        assert_eq!(
            shortfalls,
            vec![Shortfall {
                product_id: 1,
                requested: 4,
                available: 3
            }]
        );
    }

    #[test]
    fn test_cancelled_target_never_short() {
        let stock = HashMap::from([(1, (true, 0))]);
        let items = vec![line(1, 9)];
        let shortfalls = find_shortfalls(None, Reservation::new(&items, "Cancelado"), |id| {
            stock.get(&id).copied()
        });
        assert!(shortfalls.is_empty());
    }
}
