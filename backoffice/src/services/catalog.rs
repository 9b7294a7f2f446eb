//! Catalog Service - product CRUD, images and CSV with an in-memory read model
//!
//! The product cache is the list every read is served from. It is replaced
//! entry by entry, and only after the backend call for a mutation resolved.

use parking_lot::RwLock;
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

use shared::catalog::{ProductQuery, export_products_csv, parse_products_csv, query_products};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    COPY_SUFFIX, Product, ProductBulkUpdate, ProductCreate, ProductImage, ProductUpdate,
};
use shared::order::MAX_PRICE;
use shared::response::{BulkResult, PaginatedResponse};
use shared::util::{fold_text, now_millis, snowflake_id};

use crate::backend::Backend;
use crate::db::Repository;
use crate::error::{ServiceError, ServiceResult};

/// Maximum image size (5MB)
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// Accepted image extensions
pub const SUPPORTED_IMAGE_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Storage key of a product image
fn image_storage_path(product_id: i64, hash: &str, ext: &str) -> String {
    format!("products/{product_id}/{hash}.{ext}")
}

/// Free-text product field that points at a lookup entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductReference {
    Category,
    Subcategory,
    Brand,
    Label,
    CarouselState,
}

impl ProductReference {
    /// Rewrite `old` to `new` on `product`; returns whether anything changed
    fn rename(self, product: &mut Product, old: &str, new: &str) -> bool {
        let old = fold_text(old);
        let rename_one = |value: &mut Option<String>| match value {
            Some(v) if fold_text(v) == old => {
                *v = new.to_string();
                true
            }
            _ => false,
        };
        let rename_list = |values: &mut Vec<String>| {
            let mut changed = false;
            for v in values.iter_mut().filter(|v| fold_text(v) == old) {
                *v = new.to_string();
                changed = true;
            }
            changed
        };

        match self {
            ProductReference::Category => rename_list(&mut product.categories),
            ProductReference::Subcategory => rename_list(&mut product.subcategories),
            ProductReference::Brand => rename_one(&mut product.brand),
            ProductReference::Label => rename_one(&mut product.label),
            ProductReference::CarouselState => rename_one(&mut product.carousel_state),
        }
    }
}

/// Check the invariants every stored product satisfies
fn validate_product(product: &Product) -> Result<(), AppError> {
    if product.name.trim().is_empty() {
        return Err(AppError::new(ErrorCode::ProductNameRequired));
    }
    let valid_price = |p: f64| p.is_finite() && (0.0..=MAX_PRICE).contains(&p);
    if !valid_price(product.price) {
        return Err(AppError::new(ErrorCode::ProductInvalidPrice)
            .with_detail("price", product.price));
    }
    if let Some(sale) = product.sale_price.filter(|s| !valid_price(*s)) {
        return Err(AppError::new(ErrorCode::ProductInvalidPrice).with_detail("sale_price", sale));
    }
    if product.stock < 0 {
        return Err(AppError::validation("stock must not be negative")
            .with_detail("stock", product.stock));
    }
    Ok(())
}

/// Columns of `after` that differ from `before`, plus `updated_at`
fn changed_columns(before: &Product, after: &Product) -> ServiceResult<Value> {
    let (Value::Object(old), Value::Object(new)) =
        (serde_json::to_value(before)?, serde_json::to_value(after)?)
    else {
        return Err(AppError::new(ErrorCode::InternalError).into());
    };
    let mut changed: Map<String, Value> = new
        .into_iter()
        .filter(|(key, value)| key != "id" && old.get(key) != Some(value))
        .collect();
    changed.insert("updated_at".to_string(), json!(after.updated_at));
    Ok(Value::Object(changed))
}

#[derive(Clone)]
pub struct CatalogService {
    backend: Arc<dyn Backend>,
    products: Repository<Product>,
    images: Repository<ProductImage>,
    /// Products cache: id -> Product
    cache: Arc<RwLock<HashMap<i64, Product>>>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("products_count", &self.cache.read().len())
            .finish()
    }
}

impl CatalogService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            products: Repository::new(backend.clone()),
            images: Repository::new(backend.clone()),
            backend,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Load every product into the cache
    pub async fn warmup(&self) -> ServiceResult<()> {
        let products = self.products.find_all().await?;
        let count = products.len();
        let mut cache = self.cache.write();
        cache.clear();
        cache.extend(products.into_iter().map(|p| (p.id, p)));
        tracing::info!(count, "Product cache warmed up");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Cached products ordered by id
    pub fn all(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self.cache.read().values().cloned().collect();
        products.sort_by_key(|p| p.id);
        products
    }

    pub fn list(
        &self,
        query: &ProductQuery,
        hide_out_of_stock: bool,
    ) -> PaginatedResponse<Product> {
        query_products(&self.all(), query, hide_out_of_stock)
    }

    pub fn get(&self, id: i64) -> ServiceResult<Product> {
        self.cache
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::entity_not_found(ErrorCode::ProductNotFound, id).into())
    }

    /// Read a product from the backend, bypassing and refreshing the cache
    pub async fn fetch_fresh(&self, id: i64) -> ServiceResult<Option<Product>> {
        let product = self.products.find_by_id(id).await?;
        let mut cache = self.cache.write();
        match &product {
            Some(p) => {
                cache.insert(id, p.clone());
            }
            None => {
                cache.remove(&id);
            }
        }
        Ok(product)
    }

    pub fn export_csv(&self) -> String {
        export_products_csv(&self.all())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    fn store(&self, product: Product) -> Product {
        self.cache.write().insert(product.id, product.clone());
        product
    }

    /// Patch only the columns an edit touched, so a concurrent stock write
    /// from order reconciliation is kept
    async fn write_changes(&self, before: &Product, after: &Product) -> ServiceResult<Product> {
        self.write_columns(after.id, changed_columns(before, after)?)
            .await
    }

    async fn write_columns(&self, id: i64, columns: Value) -> ServiceResult<Product> {
        let updated = self.products.patch(id, columns).await?;
        Ok(self.store(updated))
    }

    pub async fn create(&self, data: ProductCreate) -> ServiceResult<Product> {
        let product = data.into_product(snowflake_id(), now_millis());
        validate_product(&product)?;
        let created = self.products.insert(&product).await?;
        tracing::info!(id = created.id, name = %created.name, "Product created");
        Ok(self.store(created))
    }

    pub async fn update(&self, id: i64, changes: ProductUpdate) -> ServiceResult<Product> {
        let before = self.get(id)?;
        let mut product = before.clone();
        changes.apply_to(&mut product);
        product.updated_at = now_millis();
        validate_product(&product)?;

        let mut columns = changed_columns(&before, &product)?;
        if let (Some(stock), Value::Object(map)) = (changes.stock, &mut columns) {
            // Sent even when it matches the cached value
            map.insert("stock".to_string(), json!(stock));
        }
        let updated = self.write_columns(id, columns).await?;
        tracing::debug!(id, "Product updated");
        Ok(updated)
    }

    /// Copy a product under a new id with the name suffixed
    pub async fn duplicate(&self, id: i64) -> ServiceResult<Product> {
        let source = self.get(id)?;
        let now = now_millis();
        let copy = Product {
            id: snowflake_id(),
            name: format!("{}{}", source.name, COPY_SUFFIX),
            created_at: now,
            updated_at: now,
            ..source
        };
        let created = self.products.insert(&copy).await?;
        tracing::info!(source = id, id = created.id, "Product duplicated");
        Ok(self.store(created))
    }

    /// Write a new stock value, used by order reconciliation
    pub async fn set_stock(&self, id: i64, stock: i64) -> ServiceResult<Product> {
        self.write_columns(id, json!({ "stock": stock, "updated_at": now_millis() }))
            .await
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let product = self.get(id)?;
        if !self.products.delete(id).await? {
            self.cache.write().remove(&id);
            return Err(AppError::entity_not_found(ErrorCode::ProductNotFound, id).into());
        }
        self.cache.write().remove(&id);
        self.cleanup_images(&product).await;
        tracing::info!(id, name = %product.name, "Product deleted");
        Ok(())
    }

    /// Remove the storage objects owned by a deleted product.
    ///
    /// Objects whose URL is still listed on another product are kept.
    /// Failures are logged and do not undo the deletion.
    async fn cleanup_images(&self, product: &Product) {
        let owned = match self.images.find_by("product_id", product.id).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(id = product.id, error = %e, "Failed to list product images");
                return;
            }
        };

        for image in &owned {
            if self.url_in_use(&image.url, product.id) {
                continue;
            }
            let Some(path) = &image.storage_path else {
                continue;
            };
            if let Err(e) = self.backend.remove_object(path).await {
                tracing::warn!(path = %path, error = %e, "Failed to remove image object");
            }
        }

        if owned.is_empty() {
            return;
        }
        if let Err(e) = self.images.delete_where("product_id", product.id).await {
            tracing::warn!(id = product.id, error = %e, "Failed to delete image rows");
        }
    }

    fn url_in_use(&self, url: &str, except: i64) -> bool {
        self.cache
            .read()
            .values()
            .any(|p| p.id != except && p.images.iter().any(|u| u == url))
    }

    // =========================================================================
    // Bulk
    // =========================================================================

    pub async fn bulk_update(&self, payload: ProductBulkUpdate) -> ServiceResult<BulkResult> {
        if payload.changes.is_empty() {
            return Err(AppError::validation("No fields to update").into());
        }
        let mut result = BulkResult::default();
        for id in payload.ids {
            match self.update(id, payload.changes.clone()).await {
                Ok(_) => result.record_success(),
                Err(e) => result.record_failure(id, AppError::from(e).message),
            }
        }
        tracing::info!(succeeded = result.succeeded, failed = result.failed, "Bulk product update");
        Ok(result)
    }

    pub async fn bulk_delete(&self, ids: Vec<i64>) -> BulkResult {
        let mut result = BulkResult::default();
        for id in ids {
            match self.delete(id).await {
                Ok(()) => result.record_success(),
                Err(e) => result.record_failure(id, AppError::from(e).message),
            }
        }
        tracing::info!(succeeded = result.succeeded, failed = result.failed, "Bulk product delete");
        result
    }

    pub async fn delete_all(&self) -> BulkResult {
        let ids = self.all().into_iter().map(|p| p.id).collect();
        self.bulk_delete(ids).await
    }

    /// Create one product per CSV data row; failed rows are reported by line number
    pub async fn import_csv(&self, content: &str) -> ServiceResult<BulkResult> {
        let rows = parse_products_csv(content)?;
        let mut result = BulkResult::default();
        for (index, data) in rows.into_iter().enumerate() {
            // Header is line 1
            let line = index as i64 + 2;
            match self.create(data).await {
                Ok(_) => result.record_success(),
                Err(e) => result.record_failure(line, AppError::from(e).message),
            }
        }
        tracing::info!(succeeded = result.succeeded, failed = result.failed, "CSV import finished");
        Ok(result)
    }

    /// Rewrite a renamed lookup value on every product that references it
    pub async fn rename_references(
        &self,
        reference: ProductReference,
        old: &str,
        new: &str,
    ) -> ServiceResult<u32> {
        if old == new {
            return Ok(0);
        }
        let mut renamed = 0;
        for before in self.all() {
            let mut product = before.clone();
            if !reference.rename(&mut product, old, new) {
                continue;
            }
            product.updated_at = now_millis();
            self.write_changes(&before, &product).await?;
            renamed += 1;
        }
        if renamed > 0 {
            tracing::info!(?reference, old, new, renamed, "Product references renamed");
        }
        Ok(renamed)
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// Validate, store and attach an uploaded image
    pub async fn upload_image(
        &self,
        id: i64,
        filename: &str,
        data: Vec<u8>,
    ) -> ServiceResult<Product> {
        let before = self.get(id)?;

        if data.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyFile).into());
        }
        if data.len() > MAX_IMAGE_SIZE {
            return Err(AppError::with_message(
                ErrorCode::FileTooLarge,
                format!("File too large: {} bytes (max {})", data.len(), MAX_IMAGE_SIZE),
            )
            .into());
        }

        let ext = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_IMAGE_FORMATS.contains(&ext.as_str()) {
            return Err(AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                format!("Unsupported format: {ext}. Supported: png, jpg, jpeg, webp"),
            )
            .into());
        }

        let hash = hex::encode(Sha256::digest(&data));
        let path = image_storage_path(id, &hash, &ext);
        let content_type = mime_guess::from_ext(&ext).first_or_octet_stream();

        self.backend
            .upload_object(&path, data, content_type.essence_str())
            .await
            .map_err(|e| {
                tracing::error!(path = %path, error = %e, "Image upload failed");
                AppError::new(ErrorCode::FileStorageFailed)
            })?;

        let url = self.backend.public_url(&path);
        if before.images.contains(&url) {
            return Ok(before);
        }

        self.images
            .insert(&ProductImage {
                id: snowflake_id(),
                product_id: id,
                url: url.clone(),
                storage_path: Some(path.clone()),
                created_at: now_millis(),
            })
            .await?;

        let mut product = before.clone();
        product.images.push(url);
        product.updated_at = now_millis();
        let updated = self.write_changes(&before, &product).await?;
        tracing::info!(id, path = %path, "Product image uploaded");
        Ok(updated)
    }

    /// Detach an image URL; the stored object is removed when this product owned it
    pub async fn remove_image(&self, id: i64, url: &str) -> ServiceResult<Product> {
        let before = self.get(id)?;
        if !before.images.iter().any(|u| u == url) {
            return Err(AppError::not_found(format!("Image {url}")).into());
        }

        let mut product = before.clone();
        product.images.retain(|u| u != url);
        product.updated_at = now_millis();
        let updated = self.write_changes(&before, &product).await?;

        let owned = self.images.find_by("product_id", id).await?;
        for image in owned.into_iter().filter(|img| img.url == url) {
            match &image.storage_path {
                Some(path) if !self.url_in_use(url, id) => {
                    self.backend.remove_object(path).await.map_err(ServiceError::from)?;
                }
                _ => {}
            }
            self.images.delete(image.id).await?;
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn service() -> (CatalogService, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new("product-images", "admin@localhost", "admin"));
        (CatalogService::new(backend.clone()), backend)
    }

    fn cream(name: &str) -> ProductCreate {
        ProductCreate {
            name: name.into(),
            price: 10.0,
            brand: Some("Avène".into()),
            categories: vec!["Facial".into()],
            track_stock: true,
            stock: 4,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_validates() {
        let (svc, _) = service();

        let err: AppError = svc.create(cream("  ")).await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::ProductNameRequired);

        let err: AppError = svc
            .create(ProductCreate { price: -1.0, ..cream("A") })
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);

        let err: AppError = svc
            .create(ProductCreate { stock: -3, ..cream("A") })
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(svc.all().is_empty());
    }

    #[tokio::test]
    async fn test_price_bounds() {
        let (svc, _) = service();

        let err: AppError = svc
            .create(ProductCreate { price: 1e11, ..cream("A") })
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);

        let err: AppError = svc
            .create(ProductCreate { sale_price: Some(MAX_PRICE + 1.0), ..cream("A") })
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);

        let a = svc
            .create(ProductCreate { price: MAX_PRICE, ..cream("A") })
            .await
            .unwrap();
        let err: AppError = svc
            .update(
                a.id,
                ProductUpdate {
                    price: Some(f64::INFINITY),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);
        assert_eq!(svc.get(a.id).unwrap().price, MAX_PRICE);
    }

    #[tokio::test]
    async fn test_edits_keep_stock_written_elsewhere() {
        let (svc, backend) = service();
        let a = svc.create(cream("A")).await.unwrap();

        // Another writer moves stock; this service's cache still says 4
        let other = CatalogService::new(backend.clone());
        other.set_stock(a.id, 1).await.unwrap();
        assert_eq!(svc.get(a.id).unwrap().stock, 4);

        let updated = svc
            .update(
                a.id,
                ProductUpdate {
                    name: Some("A renombrado".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "A renombrado");
        assert_eq!(updated.stock, 1);

        other.set_stock(a.id, 2).await.unwrap();
        svc.rename_references(ProductReference::Brand, "Avène", "Avene")
            .await
            .unwrap();
        svc.upload_image(a.id, "a.png", vec![1]).await.unwrap();

        let fresh = svc.fetch_fresh(a.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock, 2);
        assert_eq!(fresh.brand.as_deref(), Some("Avene"));
        assert_eq!(fresh.images.len(), 1);

        // An explicit stock edit still goes through
        let updated = svc
            .update(
                a.id,
                ProductUpdate {
                    stock: Some(9),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.stock, 9);

        other.set_stock(a.id, 3).await.unwrap();
        let updated = svc
            .update(
                a.id,
                ProductUpdate {
                    stock: Some(9),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.stock, 9);
    }

    #[tokio::test]
    async fn test_duplicate_keeps_fields() {
        let (svc, _) = service();
        let original = svc.create(cream("Cicalfate")).await.unwrap();
        let copy = svc.duplicate(original.id).await.unwrap();

        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "Cicalfate (copia)");
        assert_eq!(copy.price, original.price);
        assert_eq!(copy.brand, original.brand);
        assert_eq!(copy.categories, original.categories);
        assert_eq!(copy.stock, original.stock);
        assert!(copy.created_at >= original.created_at);
        assert_eq!(svc.all().len(), 2);
    }

    #[tokio::test]
    async fn test_warmup_reads_backend() {
        let (svc, backend) = service();
        svc.create(cream("A")).await.unwrap();

        let other = CatalogService::new(backend);
        assert!(other.all().is_empty());
        other.warmup().await.unwrap();
        assert_eq!(other.all().len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_update_reports_missing_ids() {
        let (svc, _) = service();
        let a = svc.create(cream("A")).await.unwrap();
        let result = svc
            .bulk_update(ProductBulkUpdate {
                ids: vec![a.id, 42],
                changes: ProductUpdate {
                    label: Some("Oferta".into()),
                    ..Default::default()
                },
            })
            .await
            .unwrap();
        assert_eq!(result.succeeded, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors[0].id, 42);
        assert_eq!(svc.get(a.id).unwrap().label.as_deref(), Some("Oferta"));
    }

    #[tokio::test]
    async fn test_rename_references() {
        let (svc, _) = service();
        let a = svc.create(cream("A")).await.unwrap();
        let b = svc
            .create(ProductCreate { brand: Some("Isdin".into()), ..cream("B") })
            .await
            .unwrap();

        let renamed = svc
            .rename_references(ProductReference::Brand, "avene", "Avène Paris")
            .await
            .unwrap();
        assert_eq!(renamed, 1);
        assert_eq!(svc.get(a.id).unwrap().brand.as_deref(), Some("Avène Paris"));
        assert_eq!(svc.get(b.id).unwrap().brand.as_deref(), Some("Isdin"));

        let renamed = svc
            .rename_references(ProductReference::Category, "Facial", "Rostro")
            .await
            .unwrap();
        assert_eq!(renamed, 2);
        assert_eq!(svc.get(b.id).unwrap().categories, vec!["Rostro"]);
    }

    #[tokio::test]
    async fn test_image_upload_and_shared_url_cleanup() {
        let (svc, backend) = service();
        let a = svc.create(cream("A")).await.unwrap();

        let err: AppError = svc
            .upload_image(a.id, "photo.gif", vec![1])
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::UnsupportedFileFormat);

        let err: AppError = svc
            .upload_image(a.id, "photo.png", vec![0; MAX_IMAGE_SIZE + 1])
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::FileTooLarge);

        let a = svc.upload_image(a.id, "photo.PNG", vec![1, 2, 3]).await.unwrap();
        assert_eq!(a.images.len(), 1);
        assert!(a.images[0].starts_with(&format!("memory://product-images/products/{}/", a.id)));
        assert_eq!(backend.object_count(), 1);

        // The duplicate lists the same URL, so deleting the original keeps the object
        let copy = svc.duplicate(a.id).await.unwrap();
        svc.delete(a.id).await.unwrap();
        assert_eq!(backend.object_count(), 1);
        assert_eq!(svc.get(copy.id).unwrap().images, a.images);
    }

    #[tokio::test]
    async fn test_delete_removes_owned_images() {
        let (svc, backend) = service();
        let a = svc.create(cream("A")).await.unwrap();
        svc.upload_image(a.id, "a.webp", vec![9, 9]).await.unwrap();
        assert_eq!(backend.object_count(), 1);

        svc.delete(a.id).await.unwrap();
        assert_eq!(backend.object_count(), 0);
        let err: AppError = svc.get(a.id).unwrap_err().into();
        assert_eq!(err.code, ErrorCode::ProductNotFound);
    }

    #[tokio::test]
    async fn test_remove_image() {
        let (svc, backend) = service();
        let a = svc.create(cream("A")).await.unwrap();
        let a = svc.upload_image(a.id, "a.jpg", vec![7]).await.unwrap();
        let url = a.images[0].clone();

        let a = svc.remove_image(a.id, &url).await.unwrap();
        assert!(a.images.is_empty());
        assert_eq!(backend.object_count(), 0);

        let err: AppError = svc.remove_image(a.id, &url).await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_import_csv() {
        let (svc, _) = service();
        let result = svc
            .import_csv("nombre,precio,stock\nA,1.5,3\nB,2,\n")
            .await
            .unwrap();
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed, 0);

        let products = svc.all();
        assert_eq!(products.len(), 2);
        assert!(products.iter().any(|p| p.name == "A" && p.track_stock && p.stock == 3));
    }
}
