//! Products: category/brand references plus a free-form attribute map
//! coerced against the resolved attribute definitions.

pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use handlers::{ApiDoc, router};
pub use models::{CreateProduct, Product, ProductFilter, ProductPage, ProductStatus, UpdateProduct};
pub use mongodb::MongoProductRepository;
pub use repository::ProductRepository;
pub use service::ProductService;
