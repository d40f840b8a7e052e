//! MongoDB implementation of AttributeRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use super::models::{AttributeDefinition, AttributeFilter};
use super::repository::AttributeRepository;
use crate::common::{EntityStatus, uuid_bson};
use crate::error::{CatalogError, CatalogResult};

#[derive(Clone)]
pub struct MongoAttributeRepository {
    collection: Collection<AttributeDefinition>,
}

impl MongoAttributeRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<AttributeDefinition>("attribute_definitions"),
        }
    }

    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "key": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_key_unique".to_string())
                        .build(),
                )
                .build(),
            // Multikey; drives resolution
            IndexModel::builder()
                .keys(doc! { "main_category_ids": 1, "status": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_main_categories_status".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Attribute definition indexes created successfully");
        Ok(())
    }

    fn build_filter(filter: &AttributeFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref main_category_id) = filter.main_category_id {
            doc.insert("main_category_ids", uuid_bson(main_category_id));
        }

        if let Some(ref status) = filter.status {
            doc.insert("status", status.to_string());
        }

        doc
    }
}

#[async_trait]
impl AttributeRepository for MongoAttributeRepository {
    #[instrument(skip(self, definition), fields(attribute_id = %definition.id, key = %definition.key))]
    async fn create(&self, definition: AttributeDefinition) -> CatalogResult<AttributeDefinition> {
        self.collection.insert_one(&definition).await?;
        tracing::info!(attribute_id = %definition.id, "Attribute definition created");
        Ok(definition)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<AttributeDefinition>> {
        Ok(self.collection.find_one(doc! { "_id": uuid_bson(&id) }).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: AttributeFilter) -> CatalogResult<Vec<AttributeDefinition>> {
        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .sort(doc! { "sort_order": 1, "key": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn key_exists(&self, key: String, exclude: Option<Uuid>) -> CatalogResult<bool> {
        let mut filter = doc! { "key": key };
        if let Some(ref id) = exclude {
            filter.insert("_id", doc! { "$ne": uuid_bson(id) });
        }
        Ok(self.collection.count_documents(filter).limit(1).await? > 0)
    }

    #[instrument(skip(self, definition), fields(attribute_id = %definition.id))]
    async fn update(&self, definition: AttributeDefinition) -> CatalogResult<AttributeDefinition> {
        let result = self
            .collection
            .replace_one(doc! { "_id": uuid_bson(&definition.id) }, &definition)
            .await?;

        if result.matched_count == 0 {
            return Err(CatalogError::not_found("Attribute", definition.id));
        }
        Ok(definition)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> CatalogResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": uuid_bson(&id) })
            .await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn find_active_for_main(
        &self,
        main_category_id: Uuid,
    ) -> CatalogResult<Vec<AttributeDefinition>> {
        self.list(AttributeFilter {
            main_category_id: Some(main_category_id),
            status: Some(EntityStatus::Active),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_matches_array_membership() {
        let main = Uuid::now_v7();
        let doc = MongoAttributeRepository::build_filter(&AttributeFilter {
            main_category_id: Some(main),
            status: Some(EntityStatus::Active),
        });
        assert_eq!(doc.get("main_category_ids"), Some(&uuid_bson(&main)));
        assert_eq!(doc.get_str("status").unwrap(), "active");
    }
}
