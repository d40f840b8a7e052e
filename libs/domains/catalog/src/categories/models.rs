use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::{EntityStatus, double_option};

/// How a subcategory's `shipping_rate` is applied at checkout
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
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShippingType {
    /// One rate per order
    Flat,
    /// Rate multiplied by quantity
    PerItem,
    /// No charge; rate is informational
    Free,
}

/// A node in the category tree.
///
/// Level 1 categories are "main" categories; everything below is a
/// subcategory and carries shipping metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    /// Unique among siblings
    pub slug: String,
    /// `None` for main categories
    pub parent_id: Option<Uuid>,
    /// Always `path.len()`
    pub level: i32,
    /// Ancestor ids from the root, ending with this category's id
    pub path: Vec<Uuid>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub shipping_type: Option<ShippingType>,
    /// Minor currency units
    #[serde(default)]
    pub shipping_rate: Option<i64>,
    #[serde(default)]
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Build a new category placed under `parent` (or at the root).
    ///
    /// Shipping fields are taken as given; the service decides whether they
    /// are required or dropped.
    pub fn new(input: CreateCategory, slug: String, parent: Option<&Category>) -> Self {
        let id = Uuid::now_v7();
        let now = Utc::now();
        let path = child_path(parent.map(|p| p.path.as_slice()), id);

        Self {
            id,
            name: input.name,
            slug,
            parent_id: parent.map(|p| p.id),
            level: path.len() as i32,
            path,
            sort_order: input.sort_order,
            shipping_type: input.shipping_type,
            shipping_rate: input.shipping_rate,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_main(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_archived(&self) -> bool {
        self.status == EntityStatus::Archived
    }

    /// Move under `parent` (or to the root), recomputing path and level.
    pub fn reparent(&mut self, parent: Option<&Category>) {
        self.parent_id = parent.map(|p| p.id);
        self.path = child_path(parent.map(|p| p.path.as_slice()), self.id);
        self.level = self.path.len() as i32;
    }
}

/// `parent_path + [id]`, or `[id]` at the root.
pub fn child_path(parent_path: Option<&[Uuid]>, id: Uuid) -> Vec<Uuid> {
    let mut path = parent_path.map(<[Uuid]>::to_vec).unwrap_or_default();
    path.push(id);
    path
}

/// DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Derived from `name` when omitted
    #[validate(custom(function = "crate::slug::validate_slug"))]
    pub slug: Option<String>,
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub sort_order: i32,
    /// Required for subcategories, ignored for main categories
    pub shipping_type: Option<ShippingType>,
    /// Required for subcategories, ignored for main categories
    #[validate(range(min = 0, message = "shipping_rate must be >= 0"))]
    pub shipping_rate: Option<i64>,
}

/// DTO for a partial category update.
///
/// `parent_id: null` moves the category to the root; omitting it leaves
/// the parent unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(custom(function = "crate::slug::validate_slug"))]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,
    pub sort_order: Option<i32>,
    pub shipping_type: Option<ShippingType>,
    #[validate(range(min = 0, message = "shipping_rate must be >= 0"))]
    pub shipping_rate: Option<i64>,
    pub status: Option<EntityStatus>,
}

impl UpdateCategory {
    pub fn changes_parent(&self, current: Option<Uuid>) -> bool {
        matches!(self.parent_id, Some(new) if new != current)
    }
}

/// Query filters for listing categories
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct CategoryFilter {
    /// Direct children of this category
    pub parent_id: Option<Uuid>,
    /// Only main categories (`parent_id` absent)
    #[serde(default)]
    pub roots_only: bool,
    pub level: Option<i32>,
    pub status: Option<EntityStatus>,
}

/// Category with its children, for the tree view
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    #[schema(no_recursion)]
    pub children: Vec<CategoryNode>,
}

/// Query filters for the tree view
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TreeParams {
    /// Omit archived categories (and their subtrees)
    #[serde(default)]
    pub active_only: bool,
}
