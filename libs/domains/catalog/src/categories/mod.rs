//! Category tree: main categories at level 1, subcategories below with
//! shipping metadata. `path`/`level` are denormalized on every node.

pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;
pub mod tree;

pub use handlers::{ApiDoc, router};
pub use models::{
    Category, CategoryFilter, CategoryNode, CreateCategory, ShippingType, UpdateCategory,
};
pub use mongodb::MongoCategoryRepository;
pub use repository::CategoryRepository;
pub use service::CategoryService;
pub use tree::CategoryTree;
