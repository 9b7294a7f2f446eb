//! Order Service - order CRUD with stock reconciliation
//!
//! Every mutation that changes what an order reserves (create, item edits,
//! status changes, delete) moves product stock by the reservation delta.
//! Those mutations are serialized by `stock_lock` and read product stock
//! fresh from the backend while holding it.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

use shared::catalog::{DEFAULT_PER_PAGE, MAX_PER_PAGE};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AvailableStock, DEFAULT_ORDER_STATUS, FIRST_ORDER_NUMBER, Order, OrderCreate, OrderItem,
    OrderItemInput, OrderStatus, OrderUpdate, Product, status_holds_stock,
};
use shared::order::{
    MAX_PRICE, MAX_QUANTITY, Reservation, available_stock, calculate_totals, find_shortfalls,
    line_subtotal, plan_adjustments, stock_deltas,
};
use shared::response::{BulkResult, PaginatedResponse};
use shared::util::{fold_text, non_blank, now_millis, snowflake_id};

use super::catalog::CatalogService;
use super::lookups::LookupTable;
use crate::backend::Backend;
use crate::db::Repository;
use crate::error::ServiceResult;

/// Order list query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQuery {
    pub status_id: Option<i64>,
    /// Matches order number, customer name and email
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl OrderQuery {
    fn matches(&self, order: &Order, needle: Option<&str>) -> bool {
        if self.status_id.is_some() && order.status_id != self.status_id {
            return false;
        }
        let Some(needle) = needle else {
            return true;
        };
        order.order_number.to_string().contains(needle)
            || fold_text(&order.customer_name).contains(needle)
            || order
                .customer_email
                .as_deref()
                .is_some_and(|e| fold_text(e).contains(needle))
    }
}

/// Query for the available-stock endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailableStockQuery {
    /// Restrict to one product (which need not be on the order)
    pub product_id: Option<i64>,
}

fn validate_items(items: &[OrderItemInput]) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    if let Some(item) = items
        .iter()
        .find(|i| !(1..=MAX_QUANTITY).contains(&i.quantity))
    {
        return Err(AppError::new(ErrorCode::OrderInvalidQuantity)
            .with_detail("product_id", item.product_id)
            .with_detail("quantity", item.quantity));
    }
    Ok(())
}

fn validate_discount(discount: f64) -> Result<(), AppError> {
    if !discount.is_finite() {
        return Err(AppError::validation("discount must be a number"));
    }
    if discount.abs() > MAX_PRICE {
        return Err(AppError::validation("discount exceeds the maximum amount")
            .with_detail("discount", discount));
    }
    Ok(())
}

/// Resolve submitted lines against the catalog
fn build_items(
    inputs: &[OrderItemInput],
    products: &HashMap<i64, Product>,
) -> Result<Vec<OrderItem>, AppError> {
    inputs
        .iter()
        .map(|input| {
            let product = products.get(&input.product_id);
            let missing =
                || AppError::entity_not_found(ErrorCode::ProductNotFound, input.product_id);

            let name = match non_blank(input.name.clone()) {
                Some(name) => name,
                None => product.ok_or_else(missing)?.name.clone(),
            };
            let price = match input.price {
                Some(price) => price,
                None => product.ok_or_else(missing)?.price,
            };
            if !price.is_finite() || !(0.0..=MAX_PRICE).contains(&price) {
                return Err(AppError::new(ErrorCode::ProductInvalidPrice)
                    .with_detail("product_id", input.product_id)
                    .with_detail("price", price));
            }
            let subtotal = line_subtotal(price, input.quantity).ok_or_else(|| {
                AppError::new(ErrorCode::OrderInvalidQuantity)
                    .with_detail("product_id", input.product_id)
            })?;
            let image = non_blank(input.image.clone())
                .or_else(|| product.and_then(|p| p.cover_image().map(str::to_string)));

            Ok(OrderItem {
                product_id: input.product_id,
                name,
                image,
                quantity: input.quantity,
                price,
                subtotal,
            })
        })
        .collect()
}

fn stock_lookup(products: &HashMap<i64, Product>) -> impl Fn(i64) -> Option<(bool, i64)> + '_ {
    move |id| products.get(&id).map(|p| (p.track_stock, p.stock))
}

/// Recompute the money fields from the items and current sale prices
fn apply_totals(order: &mut Order, products: &HashMap<i64, Product>) -> Result<(), AppError> {
    let totals = calculate_totals(&order.items, order.discount, |id| {
        let product = products.get(&id)?;
        product.active_sale_price().map(|sale| (product.price, sale))
    })
    .ok_or_else(|| AppError::validation("order amounts are out of range"))?;
    order.subtotal = totals.subtotal;
    order.product_discounts = totals.product_discounts;
    order.discount = totals.discount;
    order.total = totals.total;
    Ok(())
}

pub struct OrderService {
    orders: Repository<Order>,
    catalog: Arc<CatalogService>,
    statuses: Arc<LookupTable<OrderStatus>>,
    /// Orders cache: id -> Order
    cache: RwLock<HashMap<i64, Order>>,
    stock_lock: Mutex<()>,
    reject_oversell: bool,
}

impl OrderService {
    pub fn new(
        backend: Arc<dyn Backend>,
        catalog: Arc<CatalogService>,
        statuses: Arc<LookupTable<OrderStatus>>,
        reject_oversell: bool,
    ) -> Self {
        Self {
            orders: Repository::new(backend),
            catalog,
            statuses,
            cache: RwLock::new(HashMap::new()),
            stock_lock: Mutex::new(()),
            reject_oversell,
        }
    }

    pub async fn warmup(&self) -> ServiceResult<()> {
        let orders = self.orders.find_all().await?;
        let count = orders.len();
        let mut cache = self.cache.write();
        cache.clear();
        cache.extend(orders.into_iter().map(|o| (o.id, o)));
        tracing::info!(count, "Order cache warmed up");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Newest first
    pub fn list(&self, query: &OrderQuery) -> PaginatedResponse<Order> {
        let needle = query
            .search
            .as_deref()
            .map(fold_text)
            .filter(|s| !s.is_empty());

        let mut orders: Vec<Order> = self
            .cache
            .read()
            .values()
            .filter(|o| query.matches(o, needle.as_deref()))
            .cloned()
            .collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.order_number.cmp(&a.order_number))
        });

        let page = query.page.unwrap_or(1).max(1);
        let per_page = query
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let total = orders.len() as u64;
        let items = orders
            .into_iter()
            .skip(((page - 1) as usize).saturating_mul(per_page as usize))
            .take(per_page as usize)
            .collect();
        PaginatedResponse::new(items, page, per_page, total)
    }

    pub fn get(&self, id: i64) -> ServiceResult<Order> {
        self.cache
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::entity_not_found(ErrorCode::OrderNotFound, id).into())
    }

    /// Orders carrying `status`, by id or, for rows without one, by name
    pub fn count_with_status(&self, status: &OrderStatus) -> usize {
        let name = fold_text(&status.name);
        self.cache
            .read()
            .values()
            .filter(|o| match o.status_id {
                Some(id) => id == status.id,
                None => fold_text(&o.status) == name,
            })
            .count()
    }

    /// Stock the edit form may allocate per product
    pub async fn available_stock(
        &self,
        id: i64,
        product_id: Option<i64>,
    ) -> ServiceResult<Vec<AvailableStock>> {
        let order = self.get(id)?;
        let reservation = Reservation::new(&order.items, &order.status);

        let ids: BTreeSet<i64> = match product_id {
            Some(pid) => BTreeSet::from([pid]),
            None => order.items.iter().map(|i| i.product_id).collect(),
        };

        let mut result = Vec::with_capacity(ids.len());
        for pid in ids {
            let Some(product) = self.catalog.fetch_fresh(pid).await? else {
                if product_id.is_some() {
                    return Err(AppError::entity_not_found(ErrorCode::ProductNotFound, pid).into());
                }
                continue;
            };
            result.push(AvailableStock {
                product_id: pid,
                track_stock: product.track_stock,
                available: available_stock(product.stock, pid, Some(reservation)),
            });
        }
        Ok(result)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// `(name, id)` of the status a new order gets
    fn resolve_status(&self, status_id: Option<i64>) -> ServiceResult<(String, Option<i64>)> {
        if let Some(id) = status_id {
            let status = self.statuses.get(id)?;
            return Ok((status.name, Some(status.id)));
        }
        let default = self
            .statuses
            .find_by_name(DEFAULT_ORDER_STATUS)
            .or_else(|| self.statuses.all().into_iter().next());
        Ok(match default {
            Some(status) => (status.name, Some(status.id)),
            None => (DEFAULT_ORDER_STATUS.to_string(), None),
        })
    }

    /// Current backend rows for the given products; missing ones are absent
    async fn fresh_products(
        &self,
        ids: impl IntoIterator<Item = i64>,
    ) -> ServiceResult<HashMap<i64, Product>> {
        let ids: BTreeSet<i64> = ids.into_iter().collect();
        let mut products = HashMap::with_capacity(ids.len());
        for id in ids {
            if let Some(product) = self.catalog.fetch_fresh(id).await? {
                products.insert(id, product);
            }
        }
        Ok(products)
    }

    async fn fresh_order(&self, id: i64) -> ServiceResult<Order> {
        match self.orders.find_by_id(id).await? {
            Some(order) => Ok(order),
            None => {
                self.cache.write().remove(&id);
                Err(AppError::entity_not_found(ErrorCode::OrderNotFound, id).into())
            }
        }
    }

    async fn next_order_number(&self) -> ServiceResult<i64> {
        let orders = self.orders.find_all().await?;
        Ok(orders
            .iter()
            .map(|o| o.order_number)
            .max()
            .map_or(FIRST_ORDER_NUMBER, |n| n + 1))
    }

    fn check_oversell(
        &self,
        before: Option<Reservation<'_>>,
        after: Reservation<'_>,
        products: &HashMap<i64, Product>,
    ) -> Result<(), AppError> {
        if !self.reject_oversell {
            return Ok(());
        }
        let shortfalls = find_shortfalls(before, after, stock_lookup(products));
        if shortfalls.is_empty() {
            return Ok(());
        }
        Err(AppError::new(ErrorCode::InsufficientStock)
            .with_detail("shortfalls", json!(shortfalls)))
    }

    /// Write the stock changes implied by going from `before` to `after`
    async fn reconcile_stock(
        &self,
        before: Option<Reservation<'_>>,
        after: Option<Reservation<'_>>,
        products: &HashMap<i64, Product>,
    ) -> ServiceResult<()> {
        let deltas = stock_deltas(before, after);
        for adjustment in plan_adjustments(&deltas, stock_lookup(products)) {
            self.catalog
                .set_stock(adjustment.product_id, adjustment.after)
                .await?;
            tracing::debug!(
                product_id = adjustment.product_id,
                before = adjustment.before,
                after = adjustment.after,
                "Stock adjusted"
            );
        }
        Ok(())
    }

    fn store(&self, order: Order) -> Order {
        self.cache.write().insert(order.id, order.clone());
        order
    }

    // =========================================================================
    // Writes
    // =========================================================================

    pub async fn create(&self, data: OrderCreate) -> ServiceResult<Order> {
        validate_items(&data.items)?;
        validate_discount(data.discount)?;
        let (status, status_id) = self.resolve_status(data.status_id)?;

        let _guard = self.stock_lock.lock().await;
        let products = self
            .fresh_products(data.items.iter().map(|i| i.product_id))
            .await?;
        let items = build_items(&data.items, &products)?;

        let now = now_millis();
        let mut order = Order {
            id: snowflake_id(),
            order_number: self.next_order_number().await?,
            customer_name: data.customer_name.trim().to_string(),
            customer_email: non_blank(data.customer_email),
            customer_phone: non_blank(data.customer_phone),
            customer_address: non_blank(data.customer_address),
            items,
            subtotal: 0.0,
            discount: data.discount,
            product_discounts: 0.0,
            total: 0.0,
            status,
            status_id,
            notes: non_blank(data.notes),
            payment_method: non_blank(data.payment_method),
            created_at: now,
            updated_at: now,
        };
        apply_totals(&mut order, &products)?;
        self.check_oversell(None, Reservation::new(&order.items, &order.status), &products)?;

        let created = self.orders.insert(&order).await?;
        let created = self.store(created);
        self.reconcile_stock(
            None,
            Some(Reservation::new(&created.items, &created.status)),
            &products,
        )
        .await?;

        tracing::info!(
            id = created.id,
            order_number = created.order_number,
            total = created.total,
            "Order created"
        );
        Ok(created)
    }

    pub async fn update(&self, id: i64, data: OrderUpdate) -> ServiceResult<Order> {
        if let Some(items) = &data.items {
            validate_items(items)?;
        }
        if let Some(discount) = data.discount {
            validate_discount(discount)?;
        }
        let status = data
            .status_id
            .map(|sid| self.statuses.get(sid))
            .transpose()?;

        let _guard = self.stock_lock.lock().await;
        let original = self.fresh_order(id).await?;
        let mut order = original.clone();

        if let Some(name) = data.customer_name {
            order.customer_name = name.trim().to_string();
        }
        if data.customer_email.is_some() {
            order.customer_email = non_blank(data.customer_email);
        }
        if data.customer_phone.is_some() {
            order.customer_phone = non_blank(data.customer_phone);
        }
        if data.customer_address.is_some() {
            order.customer_address = non_blank(data.customer_address);
        }
        if data.notes.is_some() {
            order.notes = non_blank(data.notes);
        }
        if data.payment_method.is_some() {
            order.payment_method = non_blank(data.payment_method);
        }
        if let Some(status) = status {
            order.status = status.name;
            order.status_id = Some(status.id);
        }

        let reprice = data.items.is_some() || data.discount.is_some();
        let touched = original
            .items
            .iter()
            .map(|i| i.product_id)
            .chain(data.items.iter().flatten().map(|i| i.product_id));
        let products = self.fresh_products(touched).await?;

        if let Some(inputs) = &data.items {
            order.items = build_items(inputs, &products)?;
        }
        if let Some(discount) = data.discount {
            order.discount = discount;
        }
        if reprice {
            apply_totals(&mut order, &products)?;
        }
        order.updated_at = now_millis();

        let before = Reservation::new(&original.items, &original.status);
        self.check_oversell(
            Some(before),
            Reservation::new(&order.items, &order.status),
            &products,
        )?;

        let updated = self.orders.update(&order).await?;
        let updated = self.store(updated);
        self.reconcile_stock(
            Some(before),
            Some(Reservation::new(&updated.items, &updated.status)),
            &products,
        )
        .await?;

        tracing::info!(id, status = %updated.status, "Order updated");
        Ok(updated)
    }

    pub async fn change_status(&self, id: i64, status_id: i64) -> ServiceResult<Order> {
        self.update(
            id,
            OrderUpdate {
                status_id: Some(status_id),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete an order, releasing what it reserved
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let _guard = self.stock_lock.lock().await;
        let original = self.fresh_order(id).await?;
        let products = self
            .fresh_products(original.items.iter().map(|i| i.product_id))
            .await?;

        self.orders.delete(id).await?;
        self.cache.write().remove(&id);
        self.reconcile_stock(
            Some(Reservation::new(&original.items, &original.status)),
            None,
            &products,
        )
        .await?;

        tracing::info!(id, order_number = original.order_number, "Order deleted");
        Ok(())
    }

    pub async fn delete_all(&self) -> BulkResult {
        let mut ids: Vec<i64> = self.cache.read().keys().copied().collect();
        ids.sort_unstable();

        let mut result = BulkResult::default();
        for id in ids {
            match self.delete(id).await {
                Ok(()) => result.record_success(),
                Err(e) => result.record_failure(id, AppError::from(e).message),
            }
        }
        tracing::info!(succeeded = result.succeeded, failed = result.failed, "All orders deleted");
        result
    }

    /// Carry a status rename onto the orders that use it.
    ///
    /// When the rename moves the status into or out of `Cancelado`, each
    /// affected order releases or re-reserves its items, floored at zero.
    pub async fn rename_status(&self, before: &OrderStatus, new_name: &str) -> ServiceResult<u32> {
        let old_name = fold_text(&before.name);
        let moves_stock = status_holds_stock(&before.name) != status_holds_stock(new_name);

        let _guard = self.stock_lock.lock().await;
        let mut ids: Vec<i64> = self
            .cache
            .read()
            .values()
            .filter(|o| match o.status_id {
                Some(id) => id == before.id,
                None => fold_text(&o.status) == old_name,
            })
            .map(|o| o.id)
            .collect();
        ids.sort_unstable();

        let mut renamed = 0;
        for id in ids {
            let original = self.fresh_order(id).await?;
            let products = if moves_stock {
                self.fresh_products(original.items.iter().map(|i| i.product_id))
                    .await?
            } else {
                HashMap::new()
            };

            let mut order = original.clone();
            order.status = new_name.to_string();
            order.status_id = Some(before.id);
            order.updated_at = now_millis();
            let updated = self.orders.update(&order).await?;
            let updated = self.store(updated);

            if moves_stock {
                self.reconcile_stock(
                    Some(Reservation::new(&original.items, &original.status)),
                    Some(Reservation::new(&updated.items, &updated.status)),
                    &products,
                )
                .await?;
            }
            renamed += 1;
        }
        if moves_stock && renamed > 0 {
            tracing::info!(
                status = %new_name,
                orders = renamed,
                "Status rename moved reserved stock"
            );
        }
        Ok(renamed)
    }
}
