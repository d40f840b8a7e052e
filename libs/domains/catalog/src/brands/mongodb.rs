//! MongoDB implementation of BrandRepository

use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, to_bson},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use super::models::{Brand, BrandFilter};
use super::repository::BrandRepository;
use crate::common::{EntityStatus, uuid_bson};
use crate::error::{CatalogError, CatalogResult};

#[derive(Clone)]
pub struct MongoBrandRepository {
    collection: Collection<Brand>,
}

impl MongoBrandRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Brand>("brands"),
        }
    }

    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "slug": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_slug_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "main_category_id": 1, "status": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_main_category_status".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Brand indexes created successfully");
        Ok(())
    }

    fn build_filter(filter: &BrandFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref main_category_id) = filter.main_category_id {
            doc.insert("main_category_id", uuid_bson(main_category_id));
        }

        if let Some(ref status) = filter.status {
            doc.insert("status", status.to_string());
        }

        doc
    }
}

#[async_trait]
impl BrandRepository for MongoBrandRepository {
    #[instrument(skip(self, brand), fields(brand_id = %brand.id, slug = %brand.slug))]
    async fn create(&self, brand: Brand) -> CatalogResult<Brand> {
        self.collection.insert_one(&brand).await?;
        tracing::info!(brand_id = %brand.id, "Brand created");
        Ok(brand)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Brand>> {
        Ok(self.collection.find_one(doc! { "_id": uuid_bson(&id) }).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: BrandFilter) -> CatalogResult<Vec<Brand>> {
        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .sort(doc! { "name": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn slug_exists(&self, slug: String, exclude: Option<Uuid>) -> CatalogResult<bool> {
        let mut filter = doc! { "slug": slug };
        if let Some(ref id) = exclude {
            filter.insert("_id", doc! { "$ne": uuid_bson(id) });
        }
        Ok(self.collection.count_documents(filter).limit(1).await? > 0)
    }

    #[instrument(skip(self, brand), fields(brand_id = %brand.id))]
    async fn update(&self, brand: Brand) -> CatalogResult<Brand> {
        let result = self
            .collection
            .replace_one(doc! { "_id": uuid_bson(&brand.id) }, &brand)
            .await?;

        if result.matched_count == 0 {
            return Err(CatalogError::not_found("Brand", brand.id));
        }
        Ok(brand)
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
    async fn archive_by_main_category(&self, main_category_id: Uuid) -> CatalogResult<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "main_category_id": uuid_bson(&main_category_id) },
                doc! { "$set": {
                    "status": EntityStatus::Archived.to_string(),
                    "updated_at": to_bson(&Utc::now())?,
                }},
            )
            .await?;
        tracing::info!(
            %main_category_id,
            archived = result.modified_count,
            "Brands archived with their main category"
        );
        Ok(result.modified_count)
    }
}
