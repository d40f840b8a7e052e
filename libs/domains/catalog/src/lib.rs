//! Catalog Domain
//!
//! Categories, brands, attribute definitions and products, each laid out
//! the same way:
//!
//! ```text
//! handlers   ← HTTP endpoints + OpenAPI
//!    │
//! service    ← business rules, cross-aggregate checks
//!    │
//! repository ← trait + MongoDB implementation
//!    │
//! models     ← entities, DTOs
//! ```
//!
//! Services that need another aggregate's data take its repository as
//! `Arc<dyn …Repository>`, so the same Mongo repository instance can back
//! several services.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_catalog::{
//!     brands::{BrandService, MongoBrandRepository},
//!     categories::{self, CategoryService, MongoCategoryRepository},
//! };
//!
//! # async fn example(db: mongodb::Database) -> Result<(), Box<dyn std::error::Error>> {
//! let categories_repo = MongoCategoryRepository::new(&db);
//! let brands_repo = MongoBrandRepository::new(&db);
//!
//! let service = CategoryService::new(categories_repo.clone(), Arc::new(brands_repo.clone()));
//! let router = categories::router(service);
//! let _brands = BrandService::new(brands_repo, Arc::new(categories_repo));
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod brands;
pub mod categories;
pub mod common;
pub mod error;
pub mod products;
pub mod slug;

pub use common::{DeleteParams, EntityStatus};
pub use error::{CatalogError, CatalogResult};
