//! Types and helpers shared by the catalog aggregates.

use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

/// Lifecycle of categories, brands and attribute definitions
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
pub enum EntityStatus {
    #[default]
    Active,
    /// Soft-deleted; kept for history, hidden from resolution
    Archived,
}

/// `?hard=true` switches a delete from archive to removal
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct DeleteParams {
    /// Remove the document instead of archiving it
    #[serde(default)]
    pub hard: bool,
}

/// Distinguishes an absent field from an explicit `null` in PATCH bodies.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`:
/// absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Encode `id` the way the driver does when it writes a document, so
/// filters match stored values.
pub(crate) fn uuid_bson(id: &Uuid) -> Bson {
    #[derive(Serialize)]
    struct Wrapped<'a> {
        v: &'a Uuid,
    }

    mongodb::bson::to_vec(&Wrapped { v: id })
        .ok()
        .and_then(|bytes| Document::from_reader(bytes.as_slice()).ok())
        .and_then(|mut doc| doc.remove("v"))
        .unwrap_or(Bson::Null)
}

pub(crate) fn uuids_bson(ids: &[Uuid]) -> Vec<Bson> {
    ids.iter().map(uuid_bson).collect()
}

pub(crate) fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        parent_id: Option<Option<Uuid>>,
    }

    #[test]
    fn test_double_option_distinguishes_null_from_absent() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.parent_id, None);

        let null: Patch = serde_json::from_str(r#"{"parent_id":null}"#).unwrap();
        assert_eq!(null.parent_id, Some(None));

        let id = Uuid::now_v7();
        let set: Patch = serde_json::from_str(&format!(r#"{{"parent_id":"{id}"}}"#)).unwrap();
        assert_eq!(set.parent_id, Some(Some(id)));
    }

    #[test]
    fn test_uuid_bson_matches_document_encoding() {
        #[derive(Serialize)]
        struct Row {
            id: Uuid,
        }
        let id = Uuid::now_v7();
        let bytes = mongodb::bson::to_vec(&Row { id }).unwrap();
        let doc = Document::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(doc.get("id"), Some(&uuid_bson(&id)));
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIMIT);
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(EntityStatus::Archived.to_string(), "archived");
        assert_eq!("active".parse::<EntityStatus>().unwrap(), EntityStatus::Active);
    }
}
