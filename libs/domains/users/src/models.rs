use axum_helpers::auth::is_valid_permission;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

/// Mirrors the `role` custom claim of the identity provider
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
pub enum UserRole {
    Admin,
    Manager,
    Staff,
    #[default]
    Customer,
}

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
pub enum UserStatus {
    #[default]
    Active,
    /// Soft-deleted
    Disabled,
}

/// Admin-side user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Identity-provider uid (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub role: UserRole,
    /// `domain:action` strings
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(input: UpsertUser) -> Self {
        let now = Utc::now();
        Self {
            id: input.id,
            name: input.name,
            phone: input.phone,
            email: input.email,
            is_verified: input.is_verified,
            role: UserRole::default(),
            permissions: Vec::new(),
            status: UserStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh profile fields from the identity provider. Role, permissions
    /// and status are managed separately and left alone.
    pub fn apply_upsert(&mut self, input: UpsertUser) {
        self.name = input.name;
        self.phone = input.phone;
        self.email = input.email;
        self.is_verified = input.is_verified;
        self.updated_at = Utc::now();
    }

    pub fn apply_update(&mut self, update: UpdateUser) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(is_verified) = update.is_verified {
            self.is_verified = is_verified;
        }
        self.updated_at = Utc::now();
    }

    pub fn apply_claims(&mut self, claims: SetClaims) {
        self.role = claims.role;
        self.permissions = claims.into_permissions();
        self.updated_at = Utc::now();
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_permissions(permissions: &[String]) -> Result<(), ValidationError> {
    match permissions.iter().find(|p| !is_valid_permission(p)) {
        Some(bad) => Err(ValidationError::new("permissions")
            .with_message(format!("'{bad}' is not a domain:action permission").into())),
        None => Ok(()),
    }
}

/// Profile data pushed from the identity provider; creates or refreshes
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpsertUser {
    #[validate(length(min = 1, max = 128))]
    pub id: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 3, max = 32))]
    pub phone: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

/// Partial profile update; `null` clears `phone` and `email`
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(min = 3, max = 32))]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(email, length(max = 255))]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    pub is_verified: Option<bool>,
}

/// Replaces role and permissions wholesale
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetClaims {
    pub role: UserRole,
    #[serde(default)]
    #[validate(custom(function = "validate_permissions"))]
    pub permissions: Vec<String>,
}

impl SetClaims {
    /// Sorted and deduplicated
    pub fn into_permissions(self) -> Vec<String> {
        let mut permissions = self.permissions;
        permissions.sort();
        permissions.dedup();
        permissions
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    /// Page size, 1..=200 (default 50)
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: u64,
}

impl UserFilter {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// `?hard=true` removes the record instead of disabling it
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct DeleteParams {
    #[serde(default)]
    pub hard: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserPage {
    pub items: Vec<User>,
    pub total: u64,
    pub limit: i64,
    pub offset: u64,
}
