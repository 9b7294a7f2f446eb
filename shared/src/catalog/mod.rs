//! Catalog read models and data transfer
//!
//! - [`filter`]: filtering, sorting and pagination of the product list
//! - [`csv`]: bilingual CSV import and the matching export

pub mod csv;
pub mod filter;

pub use csv::{CSV_HEADER, export_products_csv, parse_products_csv};
pub use filter::{
    DEFAULT_PER_PAGE, MAX_PER_PAGE, ProductQuery, ProductSort, SortOrder, filter_products,
    query_products,
};
