//! Product list filtering, sorting and pagination

use crate::models::{Product, ProductStatus};
use crate::response::PaginatedResponse;
use crate::util::fold_text;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Sortable product columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    Name,
    Price,
    Stock,
    #[default]
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Product list query (all filters optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Matches name, brand and description
    pub search: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub brand: Option<String>,
    pub label: Option<String>,
    pub status: Option<ProductStatus>,
    pub carousel_state: Option<String>,
    /// Falls back to the saved preference when absent
    pub hide_out_of_stock: Option<bool>,
    pub sort: Option<ProductSort>,
    pub order: Option<SortOrder>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ProductQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }
}

fn same_text(a: &str, b: &str) -> bool {
    fold_text(a) == fold_text(b)
}

fn option_matches(value: Option<&str>, wanted: &str) -> bool {
    value.is_some_and(|v| same_text(v, wanted))
}

fn matches(
    product: &Product,
    query: &ProductQuery,
    hide_out_of_stock: bool,
    needle: Option<&str>,
) -> bool {
    if hide_out_of_stock && product.is_out_of_stock() {
        return false;
    }
    if let Some(needle) = needle {
        let hit = fold_text(&product.name).contains(needle)
            || product
                .brand
                .as_deref()
                .is_some_and(|b| fold_text(b).contains(needle))
            || product
                .description
                .as_deref()
                .is_some_and(|d| fold_text(d).contains(needle));
        if !hit {
            return false;
        }
    }
    let list_filter = |wanted: &Option<String>, values: &[String]| {
        wanted
            .as_deref()
            .is_none_or(|w| values.iter().any(|v| same_text(v, w)))
    };
    let tag_filter = |wanted: &Option<String>, value: Option<&str>| {
        wanted.as_deref().is_none_or(|w| option_matches(value, w))
    };

    list_filter(&query.category, &product.categories)
        && list_filter(&query.subcategory, &product.subcategories)
        && tag_filter(&query.brand, product.brand.as_deref())
        && tag_filter(&query.label, product.label.as_deref())
        && tag_filter(&query.carousel_state, product.carousel_state.as_deref())
        && query.status.is_none_or(|status| product.status == status)
}

fn compare(a: &Product, b: &Product, sort: ProductSort) -> Ordering {
    let primary = match sort {
        ProductSort::Name => fold_text(&a.name).cmp(&fold_text(&b.name)),
        ProductSort::Price => a.price.total_cmp(&b.price),
        ProductSort::Stock => a.stock.cmp(&b.stock),
        ProductSort::CreatedAt => a.created_at.cmp(&b.created_at),
        ProductSort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Filter and sort without paginating.
///
/// `hide_default` is the saved hide-out-of-stock preference, used when the
/// query does not say.
pub fn filter_products<'a>(
    products: &'a [Product],
    query: &ProductQuery,
    hide_default: bool,
) -> Vec<&'a Product> {
    let hide = query.hide_out_of_stock.unwrap_or(hide_default);
    let needle = query
        .search
        .as_deref()
        .map(fold_text)
        .filter(|s| !s.is_empty());

    let mut result: Vec<&Product> = products
        .iter()
        .filter(|p| matches(p, query, hide, needle.as_deref()))
        .collect();

    let sort = query.sort.unwrap_or_default();
    match query.order.unwrap_or_default() {
        SortOrder::Asc => result.sort_by(|a, b| compare(a, b, sort)),
        SortOrder::Desc => result.sort_by(|a, b| compare(b, a, sort)),
    }
    result
}

/// Filter, sort and return one page
pub fn query_products(
    products: &[Product],
    query: &ProductQuery,
    hide_default: bool,
) -> PaginatedResponse<Product> {
    let filtered = filter_products(products, query, hide_default);
    let total = filtered.len() as u64;
    let page = query.page();
    let per_page = query.per_page();
    let offset = ((page - 1) as usize).saturating_mul(per_page as usize);

    let items = filtered
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .cloned()
        .collect();

    PaginatedResponse::new(items, page, per_page, total)
}
