//! Generic typed repository over [`Backend`] tables

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

use crate::backend::{Backend, BackendError, Filter, Table};
use shared::models::{
    Brand, Category, Label, Order, OrderStatus, Product, ProductCarouselState, ProductImage,
    StoreSettings, Subcategory,
};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Malformed {table} row: {message}")]
    Decode { table: Table, message: String },
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// A model stored as one row of a backend table
pub trait TableRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: Table;

    fn id(&self) -> i64;
}

macro_rules! table_record {
    ($($ty:ty => $table:expr),* $(,)?) => {
        $(
            impl TableRecord for $ty {
                const TABLE: Table = $table;

                fn id(&self) -> i64 {
                    self.id
                }
            }
        )*
    };
}

table_record! {
    Product => Table::Products,
    ProductImage => Table::ProductImages,
    Category => Table::Categories,
    Subcategory => Table::Subcategories,
    Brand => Table::Brands,
    Label => Table::Labels,
    OrderStatus => Table::OrderStatuses,
    ProductCarouselState => Table::ProductCarouselStates,
    Order => Table::Orders,
    StoreSettings => Table::StoreSettings,
}

/// Typed CRUD for one table
pub struct Repository<T> {
    backend: Arc<dyn Backend>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: TableRecord> Repository<T> {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            _marker: PhantomData,
        }
    }

    fn decode(row: Value) -> RepoResult<T> {
        serde_json::from_value(row).map_err(|e| RepoError::Decode {
            table: T::TABLE,
            message: e.to_string(),
        })
    }

    fn encode(record: &T) -> RepoResult<Value> {
        serde_json::to_value(record).map_err(|e| RepoError::Decode {
            table: T::TABLE,
            message: e.to_string(),
        })
    }

    fn decode_all(rows: Vec<Value>) -> RepoResult<Vec<T>> {
        rows.into_iter().map(Self::decode).collect()
    }

    pub async fn find_all(&self) -> RepoResult<Vec<T>> {
        let rows = self.backend.select(T::TABLE, None).await?;
        Self::decode_all(rows)
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<T>> {
        let rows = self
            .backend
            .select(T::TABLE, Some(&Filter::eq("id", id)))
            .await?;
        rows.into_iter().next().map(Self::decode).transpose()
    }

    pub async fn find_by(&self, column: &'static str, value: impl ToString) -> RepoResult<Vec<T>> {
        let rows = self
            .backend
            .select(T::TABLE, Some(&Filter::eq(column, value)))
            .await?;
        Self::decode_all(rows)
    }

    pub async fn insert(&self, record: &T) -> RepoResult<T> {
        let row = self.backend.insert(T::TABLE, Self::encode(record)?).await?;
        Self::decode(row)
    }

    /// Write every column of `record` to its row
    pub async fn update(&self, record: &T) -> RepoResult<T> {
        self.patch(record.id(), Self::encode(record)?).await
    }

    /// Write only the given columns
    pub async fn patch(&self, id: i64, columns: Value) -> RepoResult<T> {
        let row = self
            .backend
            .update(T::TABLE, id, columns)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("{}:{}", T::TABLE, id)))?;
        Self::decode(row)
    }

    /// Delete by id, returns whether a row was removed
    pub async fn delete(&self, id: i64) -> RepoResult<bool> {
        let removed = self
            .backend
            .delete(T::TABLE, Some(&Filter::eq("id", id)))
            .await?;
        Ok(removed > 0)
    }

    pub async fn delete_where(
        &self,
        column: &'static str,
        value: impl ToString,
    ) -> RepoResult<u64> {
        Ok(self
            .backend
            .delete(T::TABLE, Some(&Filter::eq(column, value)))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use serde_json::json;

    fn repo<T: TableRecord>() -> Repository<T> {
        Repository::new(Arc::new(MemoryBackend::new("b", "a@b", "x")))
    }

    #[tokio::test]
    async fn test_typed_crud() {
        let repo = repo::<Label>();
        let label = Label {
            id: 10,
            name: "Nuevo".into(),
            color: Some("#00ff00".into()),
        };
        repo.insert(&label).await.unwrap();

        let found = repo.find_by_id(10).await.unwrap().unwrap();
        assert_eq!(found, label);

        let patched = repo.patch(10, json!({ "color": null })).await.unwrap();
        assert_eq!(patched.color, None);
        assert_eq!(patched.name, "Nuevo");

        assert!(repo.delete(10).await.unwrap());
        assert!(!repo.delete(10).await.unwrap());
        assert!(repo.find_by_id(10).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_patch_missing_row_is_not_found() {
        let repo = repo::<Brand>();
        let err = repo.patch(1, json!({ "name": "x" })).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_by_and_delete_where() {
        let repo = repo::<Subcategory>();
        for (id, cat) in [(1, 100), (2, 100), (3, 200)] {
            repo.insert(&Subcategory {
                id,
                name: format!("S{id}"),
                category_id: cat,
            })
            .await
            .unwrap();
        }
        assert_eq!(repo.find_by("category_id", 100).await.unwrap().len(), 2);
        assert_eq!(repo.delete_where("category_id", 100).await.unwrap(), 2);
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }
}
