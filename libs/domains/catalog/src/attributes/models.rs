use axum_helpers::FieldErrors;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::LazyLock;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::EntityStatus;

static KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+([_-][a-z0-9]+)*$").expect("attribute key regex is valid")
});

pub fn validate_attribute_key(key: &str) -> Result<(), ValidationError> {
    if KEY_RE.is_match(key) {
        Ok(())
    } else {
        Err(ValidationError::new("attribute_key").with_message(
            "must be lowercase alphanumerics separated by single '_' or '-'".into(),
        ))
    }
}

/// Kind of value an attribute holds on a product
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttributeType {
    String,
    Number,
    Boolean,
    /// `YYYY-MM-DD`
    Date,
    Enum,
    MultiEnum,
    Object,
    Array,
}

impl AttributeType {
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Enum | Self::MultiEnum)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttributeOption {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Type-specific rules.
///
/// `min`/`max` bound the character length of strings, the value of
/// numbers and the item count of arrays and multi-enums.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttributeConstraints {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    /// Regex, strings only
    #[serde(default)]
    pub pattern: Option<String>,
    /// Allowed values for `enum` / `multi_enum`
    #[serde(default)]
    pub options: Vec<AttributeOption>,
    /// Display unit, e.g. `cm`
    #[serde(default)]
    pub unit: Option<String>,
}

/// A typed product field, assigned to categories.
///
/// A `None` entry in `sub_category_ids` applies the definition to every
/// subcategory of the listed main categories (and to products without a
/// subcategory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttributeDefinition {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub key: String,
    pub label: String,
    pub value_type: AttributeType,
    #[serde(default)]
    pub constraints: AttributeConstraints,
    pub main_category_ids: Vec<Uuid>,
    #[serde(default)]
    #[schema(value_type = Vec<Option<Uuid>>)]
    pub sub_category_ids: Vec<Option<Uuid>>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttributeDefinition {
    pub fn new(input: CreateAttribute) -> Self {
        let now = Utc::now();
        let sub_category_ids = if input.sub_category_ids.is_empty() {
            vec![None]
        } else {
            dedup(input.sub_category_ids)
        };

        Self {
            id: Uuid::now_v7(),
            key: input.key,
            label: input.label,
            value_type: input.value_type,
            constraints: input.constraints,
            main_category_ids: dedup(input.main_category_ids),
            sub_category_ids,
            sort_order: input.sort_order,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateAttribute) {
        if let Some(key) = update.key {
            self.key = key;
        }
        if let Some(label) = update.label {
            self.label = label;
        }
        if let Some(value_type) = update.value_type {
            self.value_type = value_type;
        }
        if let Some(constraints) = update.constraints {
            self.constraints = constraints;
        }
        if let Some(main_category_ids) = update.main_category_ids {
            self.main_category_ids = dedup(main_category_ids);
        }
        if let Some(sub_category_ids) = update.sub_category_ids {
            self.sub_category_ids = if sub_category_ids.is_empty() {
                vec![None]
            } else {
                dedup(sub_category_ids)
            };
        }
        if let Some(sort_order) = update.sort_order {
            self.sort_order = sort_order;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }

    /// Assigned to `main` and either to all of its subcategories or to `sub`.
    pub fn applies_to(&self, main: Uuid, sub: Option<Uuid>) -> bool {
        self.main_category_ids.contains(&main)
            && (self.sub_category_ids.contains(&None) || self.sub_category_ids.contains(&sub))
    }

    /// Constraint problems that don't depend on other documents.
    pub fn consistency_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let mut push = |field: &str, message: &str| {
            errors
                .entry(field.to_string())
                .or_default()
                .push(message.to_string());
        };
        let c = &self.constraints;

        if self.value_type.has_options() {
            if c.options.is_empty() {
                push("constraints.options", "at least one option is required");
            }
            let mut seen = HashSet::new();
            if c.options.iter().any(|o| !seen.insert(o.value.as_str())) {
                push("constraints.options", "option values must be unique");
            }
            if c.options.iter().any(|o| o.value.trim().is_empty()) {
                push("constraints.options", "option values must not be blank");
            }
        } else if !c.options.is_empty() {
            push("constraints.options", "only enum and multi_enum take options");
        }

        if let (Some(min), Some(max)) = (c.min, c.max) {
            if min > max {
                push("constraints.min", "must be <= max");
            }
        }

        if let Some(ref pattern) = c.pattern {
            if self.value_type != AttributeType::String {
                push("constraints.pattern", "only string attributes take a pattern");
            } else if Regex::new(pattern).is_err() {
                push("constraints.pattern", "is not a valid regular expression");
            }
        }

        if self.main_category_ids.is_empty() {
            push("main_category_ids", "at least one main category is required");
        }

        errors
    }
}

fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAttribute {
    #[validate(custom(function = "validate_attribute_key"), length(max = 64))]
    pub key: String,
    #[validate(length(min = 1, max = 120))]
    pub label: String,
    pub value_type: AttributeType,
    #[serde(default)]
    pub constraints: AttributeConstraints,
    #[validate(length(min = 1))]
    pub main_category_ids: Vec<Uuid>,
    /// Empty means all subcategories (`[null]`)
    #[serde(default)]
    #[schema(value_type = Vec<Option<Uuid>>)]
    pub sub_category_ids: Vec<Option<Uuid>>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAttribute {
    #[validate(custom(function = "validate_attribute_key"), length(max = 64))]
    pub key: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub label: Option<String>,
    pub value_type: Option<AttributeType>,
    pub constraints: Option<AttributeConstraints>,
    #[validate(length(min = 1))]
    pub main_category_ids: Option<Vec<Uuid>>,
    #[schema(value_type = Option<Vec<Option<Uuid>>>)]
    pub sub_category_ids: Option<Vec<Option<Uuid>>>,
    pub sort_order: Option<i32>,
    pub status: Option<EntityStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct AttributeFilter {
    /// Definitions assigned to this main category
    pub main_category_id: Option<Uuid>,
    pub status: Option<EntityStatus>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ResolveParams {
    pub main_category_id: Uuid,
    pub sub_category_id: Option<Uuid>,
}

/// Definitions applicable to a (main, sub) pair, in form order
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResolvedAttributes {
    pub definitions: Vec<AttributeDefinition>,
    pub keys: Vec<String>,
}

/// Body for checking an attribute map without saving a product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ValidateAttributes {
    pub main_category_id: Uuid,
    pub sub_category_id: Option<Uuid>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub attributes: Map<String, Value>,
}
