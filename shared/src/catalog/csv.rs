//! Product CSV import/export
//!
//! The import format is deliberately simple: one header row, comma
//! separated, no quoting or escaping. Header names are matched against
//! Spanish and English aliases after trimming, lowercasing and folding
//! accents. Unknown columns are ignored.

use crate::error::{AppError, AppResult, ErrorCode};
use crate::models::{Product, ProductCreate, ProductStatus};
use crate::util::{fold_text, non_blank};

/// Name given to rows without one
pub const DEFAULT_PRODUCT_NAME: &str = "Producto sin nombre";

/// Header written by [`export_products_csv`]
pub const CSV_HEADER: &str = "name,price,sale_price,categories,subcategories,brand,label,carousel_state,description,short_description,usage,ingredients,stock,track_stock,status,images";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Price,
    SalePrice,
    Categories,
    Subcategories,
    Brand,
    Label,
    CarouselState,
    Description,
    ShortDescription,
    Usage,
    Ingredients,
    Stock,
    TrackStock,
    Status,
    Images,
}

impl Column {
    fn from_header(raw: &str) -> Option<Self> {
        let key = fold_text(raw).replace([' ', '-'], "_");
        let column = match key.as_str() {
            "name" | "nombre" => Self::Name,
            "price" | "precio" => Self::Price,
            "sale_price" | "precio_oferta" | "oferta" => Self::SalePrice,
            "category" | "categoria" | "categories" | "categorias" => Self::Categories,
            "subcategory" | "subcategoria" | "subcategories" | "subcategorias" => {
                Self::Subcategories
            }
            "brand" | "marca" => Self::Brand,
            "label" | "etiqueta" => Self::Label,
            "carousel" | "carrusel" | "carousel_state" => Self::CarouselState,
            "description" | "descripcion" => Self::Description,
            "short_description" | "descripcion_corta" => Self::ShortDescription,
            "usage" | "uso" | "modo_de_uso" => Self::Usage,
            "ingredients" | "ingredientes" => Self::Ingredients,
            "stock" | "existencias" => Self::Stock,
            "track_stock" | "controlar_stock" => Self::TrackStock,
            "status" | "estado" => Self::Status,
            "images" | "imagenes" | "image" | "imagen" => Self::Images,
            _ => return None,
        };
        Some(column)
    }
}

fn parse_money(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_start_matches('$').trim_end_matches('€').trim();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

fn parse_stock(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64))
        .map(|v| v.max(0))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match fold_text(raw).as_str() {
        "true" | "1" | "si" | "yes" | "x" | "verdadero" => Some(true),
        "false" | "0" | "no" | "falso" => Some(false),
        _ => None,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split([';', '|'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_row(columns: &[Option<Column>], line: &str) -> ProductCreate {
    let mut product = ProductCreate::default();
    let mut stock: Option<i64> = None;
    let mut track_flag: Option<bool> = None;
    let mut status: Option<ProductStatus> = None;

    for (column, raw) in columns.iter().zip(line.split(',')) {
        let Some(column) = column else {
            continue;
        };
        let text = || non_blank(Some(raw.to_string()));
        match column {
            Column::Name => product.name = raw.trim().to_string(),
            Column::Price => product.price = parse_money(raw).unwrap_or(0.0),
            Column::SalePrice => product.sale_price = parse_money(raw),
            Column::Categories => product.categories = split_list(raw),
            Column::Subcategories => product.subcategories = split_list(raw),
            Column::Brand => product.brand = text(),
            Column::Label => product.label = text(),
            Column::CarouselState => product.carousel_state = text(),
            Column::Description => product.description = text(),
            Column::ShortDescription => product.short_description = text(),
            Column::Usage => product.usage = text(),
            Column::Ingredients => product.ingredients = text(),
            Column::Stock => stock = parse_stock(raw),
            Column::TrackStock => track_flag = parse_flag(raw),
            Column::Status => status = ProductStatus::parse(raw),
            Column::Images => product.images = split_list(raw),
        }
    }

    if product.name.is_empty() {
        product.name = DEFAULT_PRODUCT_NAME.to_string();
    }
    // An explicit track_stock value wins; otherwise a numeric stock turns tracking on
    product.track_stock = track_flag.unwrap_or(stock.is_some());
    product.stock = stock.unwrap_or(0);
    product.status = Some(status.unwrap_or_default());
    product
}

/// Parse CSV text into product payloads, one per non-blank data row.
pub fn parse_products_csv(content: &str) -> AppResult<Vec<ProductCreate>> {
    let content = content.trim_start_matches('\u{feff}');
    let mut lines = content
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| AppError::new(ErrorCode::CsvEmpty))?;
    let columns: Vec<Option<Column>> = header.split(',').map(Column::from_header).collect();

    if columns.iter().all(Option::is_none) {
        return Err(AppError::new(ErrorCode::CsvMissingHeader).with_detail("header", header));
    }

    Ok(lines.map(|line| parse_row(&columns, line)).collect())
}

fn clean(value: &str) -> String {
    value.replace([',', '\n', '\r'], " ").trim().to_string()
}

fn clean_opt(value: &Option<String>) -> String {
    value.as_deref().map(clean).unwrap_or_default()
}

fn clean_list(values: &[String]) -> String {
    values.iter().map(|v| clean(v)).collect::<Vec<_>>().join(";")
}

/// Write products in the import format.
///
/// Commas inside values become spaces so the file re-imports cleanly.
pub fn export_products_csv(products: &[Product]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + products.len() * 128);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for p in products {
        let fields = [
            clean(&p.name),
            p.price.to_string(),
            p.sale_price.map(|v| v.to_string()).unwrap_or_default(),
            clean_list(&p.categories),
            clean_list(&p.subcategories),
            clean_opt(&p.brand),
            clean_opt(&p.label),
            clean_opt(&p.carousel_state),
            clean_opt(&p.description),
            clean_opt(&p.short_description),
            clean_opt(&p.usage),
            clean_opt(&p.ingredients),
            p.stock.to_string(),
            p.track_stock.to_string(),
            p.status.as_str().to_string(),
            clean_list(&p.images),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}
