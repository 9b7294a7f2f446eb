//! Lookup tables: categories, subcategories, brands, labels, order statuses
//! and carousel states
//!
//! Names are unique case- and accent-insensitively within their table
//! (subcategories: within their category). Renames are pushed to the
//! free-text references on products and orders.

use parking_lot::RwLock;
use std::sync::Arc;

use shared::error::{AppError, ErrorCode};
use shared::models::{
    Brand, BrandCreate, BrandUpdate, Category, CategoryCreate, CategoryTree, CategoryUpdate,
    Label, LabelCreate, LabelUpdate, OrderStatus, OrderStatusCreate, OrderStatusUpdate,
    ProductCarouselState, ProductCarouselStateCreate, ProductCarouselStateUpdate, Subcategory,
    SubcategoryCreate, SubcategoryUpdate,
};
use shared::util::{fold_text, non_blank, snowflake_id};

use super::catalog::{CatalogService, ProductReference};
use super::orders::OrderService;
use crate::backend::Backend;
use crate::db::{Repository, TableRecord};
use crate::error::ServiceResult;

/// A named row of a lookup table
pub trait LookupRecord: TableRecord {
    const NOT_FOUND: ErrorCode;
    const NAME_EXISTS: ErrorCode;

    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);

    /// Whether two rows compete for the same name
    fn same_scope(&self, _other: &Self) -> bool {
        true
    }
}

macro_rules! lookup_record {
    ($($ty:ty => ($not_found:expr, $exists:expr)),* $(,)?) => {
        $(
            impl LookupRecord for $ty {
                const NOT_FOUND: ErrorCode = $not_found;
                const NAME_EXISTS: ErrorCode = $exists;

                fn name(&self) -> &str {
                    &self.name
                }

                fn set_name(&mut self, name: String) {
                    self.name = name;
                }
            }
        )*
    };
}

lookup_record! {
    Category => (ErrorCode::CategoryNotFound, ErrorCode::CategoryNameExists),
    Brand => (ErrorCode::BrandNotFound, ErrorCode::BrandNameExists),
    Label => (ErrorCode::LabelNotFound, ErrorCode::LabelNameExists),
    OrderStatus => (ErrorCode::OrderStatusNotFound, ErrorCode::OrderStatusNameExists),
    ProductCarouselState => (ErrorCode::CarouselStateNotFound, ErrorCode::CarouselStateNameExists),
}

impl LookupRecord for Subcategory {
    const NOT_FOUND: ErrorCode = ErrorCode::SubcategoryNotFound;
    const NAME_EXISTS: ErrorCode = ErrorCode::SubcategoryNameExists;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn same_scope(&self, other: &Self) -> bool {
        self.category_id == other.category_id
    }
}

/// Trimmed, non-empty name
fn required_name(name: &str) -> Result<String, AppError> {
    non_blank(Some(name.to_string()))
        .ok_or_else(|| AppError::new(ErrorCode::RequiredField).with_detail("field", "name"))
}

/// Cached CRUD over one lookup table
pub struct LookupTable<T> {
    repo: Repository<T>,
    cache: RwLock<Vec<T>>,
}

impl<T: LookupRecord> LookupTable<T> {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            repo: Repository::new(backend),
            cache: RwLock::new(Vec::new()),
        }
    }

    pub async fn warmup(&self) -> ServiceResult<()> {
        let mut rows = self.repo.find_all().await?;
        rows.sort_by_key(|r| r.id());
        *self.cache.write() = rows;
        Ok(())
    }

    /// Rows in creation order
    pub fn all(&self) -> Vec<T> {
        self.cache.read().clone()
    }

    pub fn get(&self, id: i64) -> ServiceResult<T> {
        self.cache
            .read()
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| AppError::entity_not_found(T::NOT_FOUND, id).into())
    }

    /// First row whose name matches, ignoring case and accents
    pub fn find_by_name(&self, name: &str) -> Option<T> {
        let wanted = fold_text(name);
        self.cache
            .read()
            .iter()
            .find(|r| fold_text(r.name()) == wanted)
            .cloned()
    }

    fn check_unique(&self, candidate: &T) -> Result<(), AppError> {
        let wanted = fold_text(candidate.name());
        let taken = self.cache.read().iter().any(|r| {
            r.id() != candidate.id() && r.same_scope(candidate) && fold_text(r.name()) == wanted
        });
        if taken {
            return Err(AppError::new(T::NAME_EXISTS).with_detail("name", candidate.name()));
        }
        Ok(())
    }

    pub async fn create(&self, mut record: T) -> ServiceResult<T> {
        record.set_name(required_name(record.name())?);
        self.check_unique(&record)?;
        let created = self.repo.insert(&record).await?;
        self.cache.write().push(created.clone());
        let table = T::TABLE;
        tracing::info!(%table, id = created.id(), name = created.name(), "Lookup created");
        Ok(created)
    }

    /// Apply `change` to the row; returns `(before, after)`
    pub async fn update<F>(&self, id: i64, change: F) -> ServiceResult<(T, T)>
    where
        F: FnOnce(&mut T),
    {
        let before = self.get(id)?;
        let mut record = before.clone();
        change(&mut record);
        record.set_name(required_name(record.name())?);
        self.check_unique(&record)?;

        let updated = self.repo.update(&record).await?;
        if let Some(slot) = self.cache.write().iter_mut().find(|r| r.id() == id) {
            *slot = updated.clone();
        }
        Ok((before, updated))
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<T> {
        let record = self.get(id)?;
        self.repo.delete(id).await?;
        self.cache.write().retain(|r| r.id() != id);
        let table = T::TABLE;
        tracing::info!(%table, id, name = record.name(), "Lookup deleted");
        Ok(record)
    }
}

/// All lookup tables plus the cascades between them
pub struct LookupService {
    categories: LookupTable<Category>,
    subcategories: LookupTable<Subcategory>,
    brands: LookupTable<Brand>,
    labels: LookupTable<Label>,
    order_statuses: Arc<LookupTable<OrderStatus>>,
    carousel_states: LookupTable<ProductCarouselState>,
    catalog: Arc<CatalogService>,
    orders: Arc<OrderService>,
}

impl LookupService {
    pub fn new(
        backend: Arc<dyn Backend>,
        order_statuses: Arc<LookupTable<OrderStatus>>,
        catalog: Arc<CatalogService>,
        orders: Arc<OrderService>,
    ) -> Self {
        Self {
            categories: LookupTable::new(backend.clone()),
            subcategories: LookupTable::new(backend.clone()),
            brands: LookupTable::new(backend.clone()),
            labels: LookupTable::new(backend.clone()),
            carousel_states: LookupTable::new(backend),
            order_statuses,
            catalog,
            orders,
        }
    }

    pub async fn warmup(&self) -> ServiceResult<()> {
        self.categories.warmup().await?;
        self.subcategories.warmup().await?;
        self.brands.warmup().await?;
        self.labels.warmup().await?;
        self.order_statuses.warmup().await?;
        self.carousel_states.warmup().await?;
        Ok(())
    }

    async fn rename_products(
        &self,
        reference: ProductReference,
        before: &str,
        after: &str,
    ) -> ServiceResult<()> {
        if before != after {
            self.catalog.rename_references(reference, before, after).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    fn tree(&self, category: Category) -> CategoryTree {
        let subcategories = self
            .subcategories
            .all()
            .into_iter()
            .filter(|s| s.category_id == category.id)
            .collect();
        CategoryTree {
            category,
            subcategories,
        }
    }

    pub fn list_categories(&self) -> Vec<CategoryTree> {
        self.categories
            .all()
            .into_iter()
            .map(|c| self.tree(c))
            .collect()
    }

    pub fn get_category(&self, id: i64) -> ServiceResult<CategoryTree> {
        Ok(self.tree(self.categories.get(id)?))
    }

    pub async fn create_category(&self, data: CategoryCreate) -> ServiceResult<CategoryTree> {
        let category = self
            .categories
            .create(Category {
                id: snowflake_id(),
                name: data.name,
            })
            .await?;
        Ok(self.tree(category))
    }

    pub async fn update_category(
        &self,
        id: i64,
        data: CategoryUpdate,
    ) -> ServiceResult<CategoryTree> {
        let (before, after) = self
            .categories
            .update(id, |c| {
                if let Some(name) = data.name {
                    c.name = name;
                }
            })
            .await?;
        self.rename_products(ProductReference::Category, &before.name, &after.name)
            .await?;
        Ok(self.tree(after))
    }

    /// Delete a category together with its subcategories
    pub async fn delete_category(&self, id: i64) -> ServiceResult<()> {
        self.categories.get(id)?;
        for sub in self.list_subcategories(Some(id)) {
            self.subcategories.delete(sub.id).await?;
        }
        self.categories.delete(id).await?;
        Ok(())
    }

    // =========================================================================
    // Subcategories
    // =========================================================================

    pub fn list_subcategories(&self, category_id: Option<i64>) -> Vec<Subcategory> {
        self.subcategories
            .all()
            .into_iter()
            .filter(|s| category_id.is_none_or(|c| s.category_id == c))
            .collect()
    }

    pub fn get_subcategory(&self, id: i64) -> ServiceResult<Subcategory> {
        self.subcategories.get(id)
    }

    pub async fn create_subcategory(&self, data: SubcategoryCreate) -> ServiceResult<Subcategory> {
        self.categories.get(data.category_id)?;
        self.subcategories
            .create(Subcategory {
                id: snowflake_id(),
                name: data.name,
                category_id: data.category_id,
            })
            .await
    }

    pub async fn update_subcategory(
        &self,
        id: i64,
        data: SubcategoryUpdate,
    ) -> ServiceResult<Subcategory> {
        if let Some(category_id) = data.category_id {
            self.categories.get(category_id)?;
        }
        let (before, after) = self
            .subcategories
            .update(id, |s| {
                if let Some(name) = data.name {
                    s.name = name;
                }
                if let Some(category_id) = data.category_id {
                    s.category_id = category_id;
                }
            })
            .await?;
        self.rename_products(ProductReference::Subcategory, &before.name, &after.name)
            .await?;
        Ok(after)
    }

    pub async fn delete_subcategory(&self, id: i64) -> ServiceResult<()> {
        self.subcategories.delete(id).await?;
        Ok(())
    }

    // =========================================================================
    // Brands
    // =========================================================================

    pub fn list_brands(&self) -> Vec<Brand> {
        self.brands.all()
    }

    pub fn get_brand(&self, id: i64) -> ServiceResult<Brand> {
        self.brands.get(id)
    }

    pub async fn create_brand(&self, data: BrandCreate) -> ServiceResult<Brand> {
        self.brands
            .create(Brand {
                id: snowflake_id(),
                name: data.name,
            })
            .await
    }

    pub async fn update_brand(&self, id: i64, data: BrandUpdate) -> ServiceResult<Brand> {
        let (before, after) = self
            .brands
            .update(id, |b| {
                if let Some(name) = data.name {
                    b.name = name;
                }
            })
            .await?;
        self.rename_products(ProductReference::Brand, &before.name, &after.name)
            .await?;
        Ok(after)
    }

    pub async fn delete_brand(&self, id: i64) -> ServiceResult<()> {
        self.brands.delete(id).await?;
        Ok(())
    }

    // =========================================================================
    // Labels
    // =========================================================================

    pub fn list_labels(&self) -> Vec<Label> {
        self.labels.all()
    }

    pub fn get_label(&self, id: i64) -> ServiceResult<Label> {
        self.labels.get(id)
    }

    pub async fn create_label(&self, data: LabelCreate) -> ServiceResult<Label> {
        self.labels
            .create(Label {
                id: snowflake_id(),
                name: data.name,
                color: non_blank(data.color),
            })
            .await
    }

    pub async fn update_label(&self, id: i64, data: LabelUpdate) -> ServiceResult<Label> {
        let (before, after) = self
            .labels
            .update(id, |l| {
                if let Some(name) = data.name {
                    l.name = name;
                }
                if data.color.is_some() {
                    l.color = non_blank(data.color);
                }
            })
            .await?;
        self.rename_products(ProductReference::Label, &before.name, &after.name)
            .await?;
        Ok(after)
    }

    pub async fn delete_label(&self, id: i64) -> ServiceResult<()> {
        self.labels.delete(id).await?;
        Ok(())
    }

    // =========================================================================
    // Order statuses
    // =========================================================================

    pub fn list_order_statuses(&self) -> Vec<OrderStatus> {
        self.order_statuses.all()
    }

    pub fn get_order_status(&self, id: i64) -> ServiceResult<OrderStatus> {
        self.order_statuses.get(id)
    }

    pub async fn create_order_status(&self, data: OrderStatusCreate) -> ServiceResult<OrderStatus> {
        self.order_statuses
            .create(OrderStatus {
                id: snowflake_id(),
                name: data.name,
                color: non_blank(data.color),
            })
            .await
    }

    pub async fn update_order_status(
        &self,
        id: i64,
        data: OrderStatusUpdate,
    ) -> ServiceResult<OrderStatus> {
        let (before, after) = self
            .order_statuses
            .update(id, |s| {
                if let Some(name) = data.name {
                    s.name = name;
                }
                if data.color.is_some() {
                    s.color = non_blank(data.color);
                }
            })
            .await?;
        if before.name != after.name {
            self.orders.rename_status(&before, &after.name).await?;
        }
        Ok(after)
    }

    /// Refused while any order still carries the status
    pub async fn delete_order_status(&self, id: i64) -> ServiceResult<()> {
        let status = self.order_statuses.get(id)?;
        let in_use = self.orders.count_with_status(&status);
        if in_use > 0 {
            return Err(AppError::new(ErrorCode::OrderStatusInUse)
                .with_detail("id", id)
                .with_detail("orders", in_use)
                .into());
        }
        self.order_statuses.delete(id).await?;
        Ok(())
    }

    // =========================================================================
    // Carousel states
    // =========================================================================

    pub fn list_carousel_states(&self) -> Vec<ProductCarouselState> {
        self.carousel_states.all()
    }

    pub fn get_carousel_state(&self, id: i64) -> ServiceResult<ProductCarouselState> {
        self.carousel_states.get(id)
    }

    pub async fn create_carousel_state(
        &self,
        data: ProductCarouselStateCreate,
    ) -> ServiceResult<ProductCarouselState> {
        self.carousel_states
            .create(ProductCarouselState {
                id: snowflake_id(),
                name: data.name,
                kind: non_blank(data.kind),
                color: non_blank(data.color),
            })
            .await
    }

    pub async fn update_carousel_state(
        &self,
        id: i64,
        data: ProductCarouselStateUpdate,
    ) -> ServiceResult<ProductCarouselState> {
        let (before, after) = self
            .carousel_states
            .update(id, |s| {
                if let Some(name) = data.name {
                    s.name = name;
                }
                if data.kind.is_some() {
                    s.kind = non_blank(data.kind);
                }
                if data.color.is_some() {
                    s.color = non_blank(data.color);
                }
            })
            .await?;
        self.rename_products(ProductReference::CarouselState, &before.name, &after.name)
            .await?;
        Ok(after)
    }

    pub async fn delete_carousel_state(&self, id: i64) -> ServiceResult<()> {
        self.carousel_states.delete(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use shared::models::{OrderCreate, OrderItemInput, ProductCreate};

    struct Fixture {
        lookups: LookupService,
        catalog: Arc<CatalogService>,
        orders: Arc<OrderService>,
    }

    fn fixture() -> Fixture {
        let backend: Arc<dyn Backend> =
            Arc::new(MemoryBackend::new("product-images", "admin@localhost", "admin"));
        let catalog = Arc::new(CatalogService::new(backend.clone()));
        let statuses = Arc::new(LookupTable::new(backend.clone()));
        let orders = Arc::new(OrderService::new(
            backend.clone(),
            catalog.clone(),
            statuses.clone(),
            false,
        ));
        let lookups = LookupService::new(backend, statuses, catalog.clone(), orders.clone());
        Fixture {
            lookups,
            catalog,
            orders,
        }
    }

    #[tokio::test]
    async fn test_names_unique_ignoring_case_and_accents() {
        let f = fixture();
        f.lookups
            .create_brand(BrandCreate { name: " Avène ".into() })
            .await
            .unwrap();
        let err: AppError = f
            .lookups
            .create_brand(BrandCreate { name: "AVENE".into() })
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::BrandNameExists);

        let err: AppError = f
            .lookups
            .create_brand(BrandCreate { name: "   ".into() })
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert_eq!(f.lookups.list_brands()[0].name, "Avène");
    }

    #[tokio::test]
    async fn test_subcategory_names_scoped_to_category() {
        let f = fixture();
        let facial = f
            .lookups
            .create_category(CategoryCreate { name: "Facial".into() })
            .await
            .unwrap();
        let body = f
            .lookups
            .create_category(CategoryCreate { name: "Corporal".into() })
            .await
            .unwrap();

        for category_id in [facial.category.id, body.category.id] {
            f.lookups
                .create_subcategory(SubcategoryCreate {
                    name: "Hidratación".into(),
                    category_id,
                })
                .await
                .unwrap();
        }
        let err: AppError = f
            .lookups
            .create_subcategory(SubcategoryCreate {
                name: "hidratacion".into(),
                category_id: facial.category.id,
            })
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::SubcategoryNameExists);

        let err: AppError = f
            .lookups
            .create_subcategory(SubcategoryCreate {
                name: "Sérums".into(),
                category_id: 1,
            })
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::CategoryNotFound);

        assert_eq!(f.lookups.get_category(facial.category.id).unwrap().subcategories.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_category_cascades() {
        let f = fixture();
        let solar = f
            .lookups
            .create_category(CategoryCreate { name: "Solar".into() })
            .await
            .unwrap();
        f.lookups
            .create_subcategory(SubcategoryCreate {
                name: "Protector facial".into(),
                category_id: solar.category.id,
            })
            .await
            .unwrap();

        f.lookups.delete_category(solar.category.id).await.unwrap();
        assert!(f.lookups.list_categories().is_empty());
        assert!(f.lookups.list_subcategories(None).is_empty());
    }

    #[tokio::test]
    async fn test_rename_cascades_to_products() {
        let f = fixture();
        let label = f
            .lookups
            .create_label(LabelCreate {
                name: "Nuevo".into(),
                color: Some("#22c55e".into()),
            })
            .await
            .unwrap();
        let product = f
            .catalog
            .create(ProductCreate {
                name: "Crema".into(),
                label: Some("Nuevo".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = f
            .lookups
            .update_label(
                label.id,
                LabelUpdate {
                    name: Some("Novedad".into()),
                    color: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.color.as_deref(), Some("#22c55e"));
        assert_eq!(
            f.catalog.get(product.id).unwrap().label.as_deref(),
            Some("Novedad")
        );
    }

    #[tokio::test]
    async fn test_order_status_in_use_and_rename() {
        let f = fixture();
        let pending = f
            .lookups
            .create_order_status(OrderStatusCreate {
                name: "Pendiente".into(),
                color: None,
            })
            .await
            .unwrap();
        let product = f
            .catalog
            .create(ProductCreate {
                name: "Crema".into(),
                price: 5.0,
                ..Default::default()
            })
            .await
            .unwrap();
        let order = f
            .orders
            .create(OrderCreate {
                customer_name: "Lucía".into(),
                items: vec![OrderItemInput {
                    product_id: product.id,
                    quantity: 1,
                    name: None,
                    image: None,
                    price: None,
                }],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(order.status_id, Some(pending.id));

        let err: AppError = f
            .lookups
            .delete_order_status(pending.id)
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::OrderStatusInUse);

        f.lookups
            .update_order_status(
                pending.id,
                OrderStatusUpdate {
                    name: Some("En espera".into()),
                    color: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(f.orders.get(order.id).unwrap().status, "En espera");

        f.orders.delete(order.id).await.unwrap();
        f.lookups.delete_order_status(pending.id).await.unwrap();
        assert!(f.lookups.list_order_statuses().is_empty());
    }

    #[tokio::test]
    async fn test_renaming_cancelled_status_reserves_stock_again() {
        let f = fixture();
        let cancelled = f
            .lookups
            .create_order_status(OrderStatusCreate {
                name: "Cancelado".into(),
                color: None,
            })
            .await
            .unwrap();
        let product = f
            .catalog
            .create(ProductCreate {
                name: "Crema".into(),
                price: 5.0,
                track_stock: true,
                stock: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        let order = f
            .orders
            .create(OrderCreate {
                customer_name: "Lucía".into(),
                items: vec![OrderItemInput {
                    product_id: product.id,
                    quantity: 3,
                    name: None,
                    image: None,
                    price: None,
                }],
                status_id: Some(cancelled.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(f.catalog.get(product.id).unwrap().stock, 10);

        f.lookups
            .update_order_status(
                cancelled.id,
                OrderStatusUpdate {
                    name: Some("Anulado".into()),
                    color: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(f.catalog.get(product.id).unwrap().stock, 7);

        f.orders.delete(order.id).await.unwrap();
        assert_eq!(f.catalog.get(product.id).unwrap().stock, 10);
    }
}
