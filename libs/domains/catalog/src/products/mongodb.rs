//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use super::models::{Product, ProductFilter};
use super::repository::ProductRepository;
use crate::common::{clamp_limit, uuid_bson};
use crate::error::{CatalogError, CatalogResult};

#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Product>("products"),
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
                .keys(doc! { "main_category_id": 1, "sub_category_id": 1, "status": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_categories_status".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "brand_id": 1 })
                .options(IndexOptions::builder().name("idx_brand".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "title_lower": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_title_lower".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    fn build_filter(filter: &ProductFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref id) = filter.main_category_id {
            doc.insert("main_category_id", uuid_bson(id));
        }
        if let Some(ref id) = filter.sub_category_id {
            doc.insert("sub_category_id", uuid_bson(id));
        }
        if let Some(ref id) = filter.brand_id {
            doc.insert("brand_id", uuid_bson(id));
        }
        if let Some(ref status) = filter.status {
            doc.insert("status", status.to_string());
        }

        // title_lower is stored lowercased, so a literal substring match
        // on the lowercased term is case-insensitive
        if let Some(search) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            doc.insert(
                "title_lower",
                doc! { "$regex": regex::escape(&search.to_lowercase()) },
            );
        }

        doc
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, product), fields(product_id = %product.id, slug = %product.slug))]
    async fn create(&self, product: Product) -> CatalogResult<Product> {
        self.collection.insert_one(&product).await?;
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Product>> {
        Ok(self.collection.find_one(doc! { "_id": uuid_bson(&id) }).await?)
    }

    #[instrument(skip(self))]
    async fn get_by_slug(&self, slug: String) -> CatalogResult<Option<Product>> {
        Ok(self.collection.find_one(doc! { "slug": slug }).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .sort(doc! { "created_at": -1 })
            .skip(filter.offset)
            .limit(clamp_limit(filter.limit))
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: ProductFilter) -> CatalogResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::build_filter(&filter))
            .await?)
    }

    #[instrument(skip(self))]
    async fn slug_exists(&self, slug: String, exclude: Option<Uuid>) -> CatalogResult<bool> {
        let mut filter = doc! { "slug": slug };
        if let Some(ref id) = exclude {
            filter.insert("_id", doc! { "$ne": uuid_bson(id) });
        }
        Ok(self.collection.count_documents(filter).limit(1).await? > 0)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn update(&self, product: Product) -> CatalogResult<Product> {
        let result = self
            .collection
            .replace_one(doc! { "_id": uuid_bson(&product.id) }, &product)
            .await?;

        if result.matched_count == 0 {
            return Err(CatalogError::not_found("Product", product.id));
        }
        tracing::info!(product_id = %product.id, "Product updated");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> CatalogResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": uuid_bson(&id) })
            .await?;
        Ok(result.deleted_count > 0)
    }
}
