use async_trait::async_trait;
use uuid::Uuid;

use super::models::{Brand, BrandFilter};
use crate::error::CatalogResult;

/// Persistence for brands
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrandRepository: Send + Sync {
    async fn create(&self, brand: Brand) -> CatalogResult<Brand>;

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Brand>>;

    async fn list(&self, filter: BrandFilter) -> CatalogResult<Vec<Brand>>;

    /// Whether another brand already uses `slug`
    async fn slug_exists(&self, slug: String, exclude: Option<Uuid>) -> CatalogResult<bool>;

    async fn update(&self, brand: Brand) -> CatalogResult<Brand>;

    async fn delete(&self, id: Uuid) -> CatalogResult<bool>;

    /// Archive every brand scoped to `main_category_id`
    async fn archive_by_main_category(&self, main_category_id: Uuid) -> CatalogResult<u64>;
}
