//! Users Domain
//!
//! Admin-side user records. Users authenticate against an external identity
//! provider; this crate stores their profile and mirrors the `role` and
//! `permissions` custom claims that the RBAC layer reads from bearer tokens.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (/users, /me)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Upsert, claims, soft/hard delete
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, enums
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{MongoUserRepository, UserService, handlers};
//!
//! # async fn example(db: mongodb::Database) -> Result<(), domain_users::UserError> {
//! let repository = MongoUserRepository::new(&db);
//! repository.init_indexes().await?;
//!
//! let service = UserService::new(repository);
//! let users = handlers::router(service.clone());
//! let me = handlers::me_router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use handlers::{ApiDoc, MeApiDoc};
pub use models::{
    DeleteParams, SetClaims, UpdateUser, UpsertUser, User, UserFilter, UserPage, UserRole,
    UserStatus,
};
pub use mongodb::MongoUserRepository;
pub use repository::UserRepository;
pub use service::UserService;
