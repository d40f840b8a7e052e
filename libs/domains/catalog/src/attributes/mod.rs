//! Attribute definitions, the category resolver and the validation schema
//! built from resolved definitions.

pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod resolver;
pub mod schema;
pub mod service;

pub use handlers::{ApiDoc, router};
pub use models::{
    AttributeConstraints, AttributeDefinition, AttributeFilter, AttributeOption, AttributeType,
    CreateAttribute, ResolvedAttributes, UpdateAttribute,
};
pub use mongodb::MongoAttributeRepository;
pub use repository::AttributeRepository;
pub use resolver::resolve;
pub use schema::AttributeSchema;
pub use service::{AttributeService, validate_attribute_map};
