use async_trait::async_trait;
use uuid::Uuid;

use super::models::{AttributeDefinition, AttributeFilter};
use crate::error::CatalogResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttributeRepository: Send + Sync {
    async fn create(&self, definition: AttributeDefinition) -> CatalogResult<AttributeDefinition>;

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<AttributeDefinition>>;

    /// Ordered by `sort_order`, then `key`
    async fn list(&self, filter: AttributeFilter) -> CatalogResult<Vec<AttributeDefinition>>;

    async fn key_exists(&self, key: String, exclude: Option<Uuid>) -> CatalogResult<bool>;

    async fn update(&self, definition: AttributeDefinition) -> CatalogResult<AttributeDefinition>;

    async fn delete(&self, id: Uuid) -> CatalogResult<bool>;

    /// Active definitions assigned to `main_category_id`; input to the resolver
    async fn find_active_for_main(
        &self,
        main_category_id: Uuid,
    ) -> CatalogResult<Vec<AttributeDefinition>>;
}
