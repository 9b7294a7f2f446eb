//! Fallback data set for the in-memory backend

use serde::Serialize;

use super::{Backend, BackendResult, Table};
use shared::models::{
    Brand, Category, Label, OrderStatus, Product, ProductCarouselState, ProductCreate,
    StoreSettings, Subcategory,
};
use shared::util::{now_millis, snowflake_id};

/// Order statuses every store starts with
pub const DEFAULT_ORDER_STATUSES: [(&str, &str); 5] = [
    ("Pendiente", "#f59e0b"),
    ("Confirmado", "#3b82f6"),
    ("Enviado", "#8b5cf6"),
    ("Entregado", "#10b981"),
    ("Cancelado", "#ef4444"),
];

const CATEGORIES: [(&str, &[&str]); 4] = [
    ("Facial", &["Limpieza", "Hidratación", "Sérums"]),
    ("Corporal", &["Hidratación corporal", "Higiene"]),
    ("Solar", &["Protector facial", "Protector corporal"]),
    ("Cabello", &["Anticaída", "Champú"]),
];

const BRANDS: [&str; 4] = ["Avène", "La Roche-Posay", "Isdin", "Bioderma"];

const LABELS: [(&str, &str); 3] = [
    ("Nuevo", "#22c55e"),
    ("Oferta", "#ef4444"),
    ("Más vendido", "#f97316"),
];

const CAROUSEL_STATES: [(&str, &str, &str); 3] = [
    ("Destacados", "featured", "#6366f1"),
    ("Novedades", "new", "#14b8a6"),
    ("Ofertas", "sale", "#ef4444"),
];

async fn put<T: Serialize>(backend: &dyn Backend, table: Table, row: &T) -> BackendResult<()> {
    backend.insert(table, serde_json::to_value(row)?).await?;
    Ok(())
}

fn sample_products(now: i64) -> Vec<Product> {
    let samples = [
        ProductCreate {
            name: "Cicalfate+ Crema Reparadora".into(),
            price: 14.9,
            categories: vec!["Facial".into(), "Corporal".into()],
            subcategories: vec!["Hidratación".into()],
            brand: Some("Avène".into()),
            label: Some("Más vendido".into()),
            carousel_state: Some("Destacados".into()),
            short_description: Some("Crema reparadora para piel irritada".into()),
            track_stock: true,
            stock: 25,
            ..Default::default()
        },
        ProductCreate {
            name: "Fusion Water Magic SPF50".into(),
            price: 24.5,
            sale_price: Some(19.9),
            categories: vec!["Solar".into()],
            subcategories: vec!["Protector facial".into()],
            brand: Some("Isdin".into()),
            label: Some("Oferta".into()),
            carousel_state: Some("Ofertas".into()),
            track_stock: true,
            stock: 12,
            ..Default::default()
        },
        ProductCreate {
            name: "Sensibio H2O Agua Micelar".into(),
            price: 11.95,
            categories: vec!["Facial".into()],
            subcategories: vec!["Limpieza".into()],
            brand: Some("Bioderma".into()),
            track_stock: true,
            stock: 0,
            ..Default::default()
        },
        ProductCreate {
            name: "Effaclar Gel Limpiador".into(),
            price: 15.5,
            categories: vec!["Facial".into()],
            subcategories: vec!["Limpieza".into()],
            brand: Some("La Roche-Posay".into()),
            label: Some("Nuevo".into()),
            carousel_state: Some("Novedades".into()),
            ..Default::default()
        },
    ];

    samples
        .into_iter()
        .map(|p| p.into_product(snowflake_id(), now))
        .collect()
}

/// Insert the fallback catalog, lookup tables and store settings
pub async fn seed_fallback_data(backend: &dyn Backend) -> BackendResult<()> {
    let now = now_millis();

    for (name, color) in DEFAULT_ORDER_STATUSES {
        let status = OrderStatus {
            id: snowflake_id(),
            name: name.to_string(),
            color: Some(color.to_string()),
        };
        put(backend, Table::OrderStatuses, &status).await?;
    }

    for (name, subcategories) in CATEGORIES {
        let category = Category {
            id: snowflake_id(),
            name: name.to_string(),
        };
        put(backend, Table::Categories, &category).await?;
        for sub in subcategories {
            let subcategory = Subcategory {
                id: snowflake_id(),
                name: sub.to_string(),
                category_id: category.id,
            };
            put(backend, Table::Subcategories, &subcategory).await?;
        }
    }

    for name in BRANDS {
        let brand = Brand {
            id: snowflake_id(),
            name: name.to_string(),
        };
        put(backend, Table::Brands, &brand).await?;
    }

    for (name, color) in LABELS {
        let label = Label {
            id: snowflake_id(),
            name: name.to_string(),
            color: Some(color.to_string()),
        };
        put(backend, Table::Labels, &label).await?;
    }

    for (name, kind, color) in CAROUSEL_STATES {
        let state = ProductCarouselState {
            id: snowflake_id(),
            name: name.to_string(),
            kind: Some(kind.to_string()),
            color: Some(color.to_string()),
        };
        put(backend, Table::ProductCarouselStates, &state).await?;
    }

    for product in sample_products(now) {
        put(backend, Table::Products, &product).await?;
    }

    put(
        backend,
        Table::StoreSettings,
        &StoreSettings::initial(snowflake_id(), now),
    )
    .await?;

    tracing::info!("Seeded in-memory backend with fallback data");
    Ok(())
}
