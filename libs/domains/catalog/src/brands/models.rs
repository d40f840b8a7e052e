use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::{EntityStatus, double_option};

/// A brand, scoped to one main category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Brand {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    /// Globally unique
    pub slug: String,
    /// Level-1 category this brand belongs to
    pub main_category_id: Uuid,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Brand {
    pub fn new(input: CreateBrand, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            slug,
            main_category_id: input.main_category_id,
            description: input.description,
            logo_url: input.logo_url,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a patch; `slug` is resolved by the caller.
    pub fn apply_update(&mut self, update: UpdateBrand) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(slug) = update.slug {
            self.slug = slug;
        }
        if let Some(main_category_id) = update.main_category_id {
            self.main_category_id = main_category_id;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(logo_url) = update.logo_url {
            self.logo_url = logo_url;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBrand {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Derived from `name` when omitted
    #[validate(custom(function = "crate::slug::validate_slug"))]
    pub slug: Option<String>,
    pub main_category_id: Uuid,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
}

/// Partial update; `null` clears `description` / `logo_url`
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBrand {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(custom(function = "crate::slug::validate_slug"))]
    pub slug: Option<String>,
    pub main_category_id: Option<Uuid>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub logo_url: Option<Option<String>>,
    pub status: Option<EntityStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct BrandFilter {
    pub main_category_id: Option<Uuid>,
    pub status: Option<EntityStatus>,
}
