//! Catalog routes: categories, brands, attributes and products.

use std::sync::Arc;

use axum::Router;
use domain_catalog::{
    CatalogResult,
    attributes::{self, AttributeRepository, AttributeService, MongoAttributeRepository},
    brands::{self, BrandRepository, BrandService, MongoBrandRepository},
    categories::{self, CategoryRepository, CategoryService, MongoCategoryRepository},
    products::{self, MongoProductRepository, ProductService},
};
use mongodb::Database;

/// One repository per collection, shared by every service that reads it
#[derive(Clone)]
pub struct Repositories {
    categories: MongoCategoryRepository,
    brands: MongoBrandRepository,
    attributes: MongoAttributeRepository,
    products: MongoProductRepository,
}

impl Repositories {
    pub fn new(db: &Database) -> Self {
        Self {
            categories: MongoCategoryRepository::new(db),
            brands: MongoBrandRepository::new(db),
            attributes: MongoAttributeRepository::new(db),
            products: MongoProductRepository::new(db),
        }
    }

    pub async fn init_indexes(&self) -> CatalogResult<()> {
        self.categories.init_indexes().await?;
        self.brands.init_indexes().await?;
        self.attributes.init_indexes().await?;
        self.products.init_indexes().await?;
        Ok(())
    }

    fn shared_categories(&self) -> Arc<dyn CategoryRepository> {
        Arc::new(self.categories.clone())
    }

    fn shared_brands(&self) -> Arc<dyn BrandRepository> {
        Arc::new(self.brands.clone())
    }

    fn shared_attributes(&self) -> Arc<dyn AttributeRepository> {
        Arc::new(self.attributes.clone())
    }

    pub fn categories_router(&self) -> Router {
        categories::router(CategoryService::new(
            self.categories.clone(),
            self.shared_brands(),
        ))
    }

    pub fn brands_router(&self) -> Router {
        brands::router(BrandService::new(
            self.brands.clone(),
            self.shared_categories(),
        ))
    }

    pub fn attributes_router(&self) -> Router {
        attributes::router(AttributeService::new(
            self.attributes.clone(),
            self.shared_categories(),
        ))
    }

    pub fn products_router(&self) -> Router {
        products::router(ProductService::new(
            self.products.clone(),
            self.shared_categories(),
            self.shared_brands(),
            self.shared_attributes(),
        ))
    }
}
