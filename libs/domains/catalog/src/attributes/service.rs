use axum_helpers::FieldErrors;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::models::{
    AttributeDefinition, AttributeFilter, CreateAttribute, ResolvedAttributes, UpdateAttribute,
};
use super::repository::AttributeRepository;
use super::resolver::resolve;
use super::schema::AttributeSchema;
use crate::categories::CategoryRepository;
use crate::common::EntityStatus;
use crate::error::{CatalogError, CatalogResult};

/// Resolve the definitions for `(main, sub)` and coerce `attributes`
/// against them.
pub async fn validate_attribute_map(
    repository: &dyn AttributeRepository,
    main: Uuid,
    sub: Option<Uuid>,
    attributes: &Map<String, Value>,
) -> CatalogResult<Map<String, Value>> {
    let candidates = repository.find_active_for_main(main).await?;
    let resolved = resolve(candidates, main, sub);

    AttributeSchema::new(&resolved.definitions)
        .validate(attributes)
        .map_err(|fields| CatalogError::InvalidFields {
            message: "Invalid product attributes".to_string(),
            fields,
        })
}

pub struct AttributeService<R: AttributeRepository> {
    repository: Arc<R>,
    categories: Arc<dyn CategoryRepository>,
}

impl<R: AttributeRepository> AttributeService<R> {
    pub fn new(repository: R, categories: Arc<dyn CategoryRepository>) -> Self {
        Self {
            repository: Arc::new(repository),
            categories,
        }
    }

    #[instrument(skip(self, input), fields(key = %input.key))]
    pub async fn create_attribute(
        &self,
        input: CreateAttribute,
    ) -> CatalogResult<AttributeDefinition> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let definition = AttributeDefinition::new(input);
        self.check_definition(&definition).await?;
        self.ensure_key_free(&definition.key, None).await?;

        self.repository.create(definition).await
    }

    #[instrument(skip(self))]
    pub async fn get_attribute(&self, id: Uuid) -> CatalogResult<AttributeDefinition> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Attribute", id))
    }

    #[instrument(skip(self))]
    pub async fn list_attributes(
        &self,
        filter: AttributeFilter,
    ) -> CatalogResult<Vec<AttributeDefinition>> {
        self.repository.list(filter).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_attribute(
        &self,
        id: Uuid,
        input: UpdateAttribute,
    ) -> CatalogResult<AttributeDefinition> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let mut definition = self.get_attribute(id).await?;
        if let Some(key) = input.key.as_deref().filter(|k| *k != definition.key) {
            self.ensure_key_free(key, Some(id)).await?;
        }

        definition.apply_update(input);
        self.check_definition(&definition).await?;

        self.repository.update(definition).await
    }

    #[instrument(skip(self))]
    pub async fn delete_attribute(&self, id: Uuid, hard: bool) -> CatalogResult<()> {
        if hard {
            if !self.repository.delete(id).await? {
                return Err(CatalogError::not_found("Attribute", id));
            }
            return Ok(());
        }

        let mut definition = self.get_attribute(id).await?;
        definition.apply_update(UpdateAttribute {
            status: Some(EntityStatus::Archived),
            ..Default::default()
        });
        self.repository.update(definition).await?;
        Ok(())
    }

    /// Active definitions for a product in `(main, sub)`
    #[instrument(skip(self))]
    pub async fn resolve(&self, main: Uuid, sub: Option<Uuid>) -> CatalogResult<ResolvedAttributes> {
        let candidates = self.repository.find_active_for_main(main).await?;
        Ok(resolve(candidates, main, sub))
    }

    #[instrument(skip(self, attributes))]
    pub async fn validate_attributes(
        &self,
        main: Uuid,
        sub: Option<Uuid>,
        attributes: &Map<String, Value>,
    ) -> CatalogResult<Map<String, Value>> {
        validate_attribute_map(self.repository.as_ref(), main, sub, attributes).await
    }

    /// Constraint consistency plus category references: mains must be
    /// level 1, non-null subs must be children of a listed main.
    async fn check_definition(&self, definition: &AttributeDefinition) -> CatalogResult<()> {
        let mut errors = definition.consistency_errors();

        for main in &definition.main_category_ids {
            match self.categories.get_by_id(*main).await? {
                None => push(&mut errors, "main_category_ids", format!("{main} does not exist")),
                Some(category) if !category.is_main() => push(
                    &mut errors,
                    "main_category_ids",
                    format!("{main} is not a main category"),
                ),
                Some(_) => {}
            }
        }

        for sub in definition.sub_category_ids.iter().flatten() {
            match self.categories.get_by_id(*sub).await? {
                None => push(&mut errors, "sub_category_ids", format!("{sub} does not exist")),
                Some(category)
                    if !category
                        .parent_id
                        .is_some_and(|p| definition.main_category_ids.contains(&p)) =>
                {
                    push(
                        &mut errors,
                        "sub_category_ids",
                        format!("{sub} is not a subcategory of a listed main category"),
                    )
                }
                Some(_) => {}
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::InvalidFields {
                message: "Invalid attribute definition".to_string(),
                fields: errors,
            })
        }
    }

    async fn ensure_key_free(&self, key: &str, exclude: Option<Uuid>) -> CatalogResult<()> {
        if self.repository.key_exists(key.to_string(), exclude).await? {
            return Err(CatalogError::Conflict(format!(
                "Attribute key '{key}' already exists"
            )));
        }
        Ok(())
    }
}

impl<R: AttributeRepository> Clone for AttributeService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            categories: Arc::clone(&self.categories),
        }
    }
}

fn push(errors: &mut FieldErrors, field: &str, message: String) {
    errors.entry(field.to_string()).or_default().push(message);
}
