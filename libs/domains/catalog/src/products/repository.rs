use async_trait::async_trait;
use uuid::Uuid;

use super::models::{Product, ProductFilter};
use crate::error::CatalogResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: Product) -> CatalogResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Product>>;

    async fn get_by_slug(&self, slug: String) -> CatalogResult<Option<Product>>;

    /// One page, newest first
    async fn list(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>>;

    /// Total matching `filter`, ignoring `limit`/`offset`
    async fn count(&self, filter: ProductFilter) -> CatalogResult<u64>;

    async fn slug_exists(&self, slug: String, exclude: Option<Uuid>) -> CatalogResult<bool>;

    async fn update(&self, product: Product) -> CatalogResult<Product>;

    async fn delete(&self, id: Uuid) -> CatalogResult<bool>;
}
