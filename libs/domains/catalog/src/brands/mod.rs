//! Brands. Each brand belongs to exactly one main category; slugs are
//! unique across the catalog.

pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use handlers::{ApiDoc, router};
pub use models::{Brand, BrandFilter, CreateBrand, UpdateBrand};
pub use mongodb::MongoBrandRepository;
pub use repository::BrandRepository;
pub use service::BrandService;
