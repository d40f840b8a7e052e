use async_trait::async_trait;
use uuid::Uuid;

use super::models::{Category, CategoryFilter};
use crate::error::CatalogResult;

/// Persistence for the category tree
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: Category) -> CatalogResult<Category>;

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Category>>;

    /// Categories matching the filter, ordered by `sort_order` then `name`
    async fn list(&self, filter: CategoryFilter) -> CatalogResult<Vec<Category>>;

    /// Whether a sibling under `parent_id` already uses `slug`.
    /// `exclude` skips the category being updated.
    async fn slug_exists(
        &self,
        parent_id: Option<Uuid>,
        slug: String,
        exclude: Option<Uuid>,
    ) -> CatalogResult<bool>;

    /// Replace the stored document
    async fn update(&self, category: Category) -> CatalogResult<Category>;

    /// Rewrite `path` and `level` for each `(id, path)` pair
    async fn update_paths(&self, updates: Vec<(Uuid, Vec<Uuid>)>) -> CatalogResult<u64>;

    async fn delete_many(&self, ids: Vec<Uuid>) -> CatalogResult<u64>;
}
