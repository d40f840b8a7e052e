use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidateUrl, ValidationError};

use crate::common::double_option;

pub const MAX_IMAGES: usize = 5;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub title: String,
    /// Globally unique
    pub slug: String,
    /// Lowercased title for case-insensitive search
    pub title_lower: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Minor currency units
    pub price: i64,
    pub stock: i32,
    #[serde(default)]
    pub status: ProductStatus,
    pub main_category_id: Uuid,
    #[serde(default)]
    pub sub_category_id: Option<Uuid>,
    #[serde(default)]
    pub brand_id: Option<Uuid>,
    /// Coerced against the attribute definitions resolved for the categories
    #[serde(default)]
    #[schema(value_type = Object)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// `slug` and `attributes` arrive already checked.
    pub fn new(input: CreateProduct, slug: String, attributes: Map<String, Value>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title_lower: input.title.to_lowercase(),
            title: input.title,
            slug,
            description: input.description,
            price: input.price,
            stock: input.stock,
            status: input.status,
            main_category_id: input.main_category_id,
            sub_category_id: input.sub_category_id,
            brand_id: input.brand_id,
            attributes,
            images: input.images,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a patch. Raw `attributes` are taken as given; the caller
    /// re-validates them.
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(title) = update.title {
            self.title_lower = title.to_lowercase();
            self.title = title;
        }
        if let Some(slug) = update.slug {
            self.slug = slug;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(main_category_id) = update.main_category_id {
            self.main_category_id = main_category_id;
        }
        if let Some(sub_category_id) = update.sub_category_id {
            self.sub_category_id = sub_category_id;
        }
        if let Some(brand_id) = update.brand_id {
            self.brand_id = brand_id;
        }
        if let Some(attributes) = update.attributes {
            self.attributes = attributes;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        self.updated_at = Utc::now();
    }
}

fn validate_image_urls(images: &[String]) -> Result<(), ValidationError> {
    if images.len() > MAX_IMAGES {
        return Err(ValidationError::new("images")
            .with_message(format!("at most {MAX_IMAGES} images").into()));
    }
    if images.iter().any(|url| !url.validate_url()) {
        return Err(ValidationError::new("images").with_message("must be URLs".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Derived from `title` when omitted
    #[validate(custom(function = "crate::slug::validate_slug"))]
    pub slug: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 0, message = "price must be >= 0"))]
    pub price: i64,
    #[validate(range(min = 0, message = "stock must be >= 0"))]
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub status: ProductStatus,
    pub main_category_id: Uuid,
    pub sub_category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    #[validate(custom(function = "validate_image_urls"))]
    pub images: Vec<String>,
}

/// Partial update; `null` clears `description`, `sub_category_id` and
/// `brand_id`
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(custom(function = "crate::slug::validate_slug"))]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[validate(range(min = 0, message = "price must be >= 0"))]
    pub price: Option<i64>,
    #[validate(range(min = 0, message = "stock must be >= 0"))]
    pub stock: Option<i32>,
    pub status: Option<ProductStatus>,
    pub main_category_id: Option<Uuid>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub sub_category_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub brand_id: Option<Option<Uuid>>,
    #[schema(value_type = Option<Object>)]
    pub attributes: Option<Map<String, Value>>,
    #[validate(custom(function = "validate_image_urls"))]
    pub images: Option<Vec<String>>,
}

impl UpdateProduct {
    /// Whether the patch can change which attribute definitions apply or
    /// the attribute values themselves
    pub fn touches_attributes(&self) -> bool {
        self.attributes.is_some()
            || self.main_category_id.is_some()
            || self.sub_category_id.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct ProductFilter {
    pub main_category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
    /// Case-insensitive substring of the title
    pub search: Option<String>,
    /// Page size, 1..=200 (default 50)
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: u64,
    pub limit: i64,
    pub offset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create() -> CreateProduct {
        CreateProduct {
            title: "Pixel 9 Pro".into(),
            slug: None,
            description: None,
            price: 99_900,
            stock: 3,
            status: ProductStatus::Draft,
            main_category_id: Uuid::now_v7(),
            sub_category_id: None,
            brand_id: None,
            attributes: Map::new(),
            images: vec![],
        }
    }

    #[test]
    fn test_title_lower_follows_title() {
        let mut product = Product::new(create(), "pixel-9-pro".into(), Map::new());
        assert_eq!(product.title_lower, "pixel 9 pro");

        product.apply_update(UpdateProduct {
            title: Some("Pixel 10".into()),
            ..Default::default()
        });
        assert_eq!(product.title_lower, "pixel 10");
    }

    #[test]
    fn test_update_clears_nullable_references() {
        let mut input = create();
        input.brand_id = Some(Uuid::now_v7());
        let mut product = Product::new(input, "pixel".into(), Map::new());

        let patch: UpdateProduct = serde_json::from_value(json!({ "brand_id": null })).unwrap();
        assert!(!patch.touches_attributes());
        product.apply_update(patch);
        assert!(product.brand_id.is_none());
    }

    #[test]
    fn test_image_limits() {
        let mut input = create();
        input.images = (0..6)
            .map(|i| format!("https://cdn.example.com/{i}.jpg"))
            .collect();
        assert!(input.validate().is_err());

        input.images.truncate(5);
        assert!(input.validate().is_ok());

        input.images[0] = "not a url".into();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut input = create();
        input.price = -1;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_status_defaults_to_draft() {
        let input: CreateProduct = serde_json::from_value(json!({
            "title": "Chair",
            "price": 1000,
            "main_category_id": Uuid::now_v7(),
        }))
        .unwrap();
        assert_eq!(input.status, ProductStatus::Draft);
        assert_eq!(input.stock, 0);
    }
}
