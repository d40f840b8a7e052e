//! MongoDB implementation of CategoryRepository

use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use super::models::{Category, CategoryFilter};
use super::repository::CategoryRepository;
use crate::common::{uuid_bson, uuids_bson};
use crate::error::{CatalogError, CatalogResult};

#[derive(Clone)]
pub struct MongoCategoryRepository {
    collection: Collection<Category>,
}

impl MongoCategoryRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Category>("categories"),
        }
    }

    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let indexes = vec![
            // Sibling slugs are unique; roots share parent_id = null
            IndexModel::builder()
                .keys(doc! { "parent_id": 1, "slug": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_parent_slug_unique".to_string())
                        .build(),
                )
                .build(),
            // Ancestor lookups
            IndexModel::builder()
                .keys(doc! { "path": 1 })
                .options(IndexOptions::builder().name("idx_path".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "level": 1, "status": 1, "sort_order": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_level_status".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Category indexes created successfully");
        Ok(())
    }

    fn build_filter(filter: &CategoryFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref parent_id) = filter.parent_id {
            doc.insert("parent_id", uuid_bson(parent_id));
        } else if filter.roots_only {
            doc.insert("parent_id", Bson::Null);
        }

        if let Some(level) = filter.level {
            doc.insert("level", level);
        }

        if let Some(ref status) = filter.status {
            doc.insert("status", status.to_string());
        }

        doc
    }
}

#[async_trait]
impl CategoryRepository for MongoCategoryRepository {
    #[instrument(skip(self, category), fields(category_id = %category.id, slug = %category.slug))]
    async fn create(&self, category: Category) -> CatalogResult<Category> {
        self.collection.insert_one(&category).await?;
        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Category>> {
        Ok(self.collection.find_one(doc! { "_id": uuid_bson(&id) }).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: CategoryFilter) -> CatalogResult<Vec<Category>> {
        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .sort(doc! { "sort_order": 1, "name": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn slug_exists(
        &self,
        parent_id: Option<Uuid>,
        slug: String,
        exclude: Option<Uuid>,
    ) -> CatalogResult<bool> {
        let mut filter = doc! {
            "slug": slug,
            "parent_id": parent_id.as_ref().map(uuid_bson).unwrap_or(Bson::Null),
        };
        if let Some(ref id) = exclude {
            filter.insert("_id", doc! { "$ne": uuid_bson(id) });
        }
        Ok(self.collection.count_documents(filter).limit(1).await? > 0)
    }

    #[instrument(skip(self, category), fields(category_id = %category.id))]
    async fn update(&self, category: Category) -> CatalogResult<Category> {
        let result = self
            .collection
            .replace_one(doc! { "_id": uuid_bson(&category.id) }, &category)
            .await?;

        if result.matched_count == 0 {
            return Err(CatalogError::not_found("Category", category.id));
        }
        Ok(category)
    }

    #[instrument(skip(self, updates), fields(count = updates.len()))]
    async fn update_paths(&self, updates: Vec<(Uuid, Vec<Uuid>)>) -> CatalogResult<u64> {
        let now = to_bson(&Utc::now())?;
        let mut modified = 0;

        for (id, path) in updates {
            let level = path.len() as i32;
            let result = self
                .collection
                .update_one(
                    doc! { "_id": uuid_bson(&id) },
                    doc! { "$set": {
                        "path": uuids_bson(&path),
                        "level": level,
                        "updated_at": now.clone(),
                    }},
                )
                .await?;
            modified += result.modified_count;
        }

        Ok(modified)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete_many(&self, ids: Vec<Uuid>) -> CatalogResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "_id": { "$in": uuids_bson(&ids) } })
            .await?;
        tracing::info!(deleted = result.deleted_count, "Categories deleted");
        Ok(result.deleted_count)
    }
}
