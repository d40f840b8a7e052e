//! Category Service - tree maintenance rules

use axum_helpers::FieldErrors;
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::models::{
    Category, CategoryFilter, CategoryNode, CreateCategory, ShippingType, UpdateCategory,
};
use super::repository::CategoryRepository;
use super::tree::CategoryTree;
use crate::brands::{BrandFilter, BrandRepository};
use crate::common::EntityStatus;
use crate::error::{CatalogError, CatalogResult};
use crate::slug::slugify;

/// Category operations.
///
/// Holds the brand store as well: hard-deleting a main category archives
/// the brands scoped to it.
pub struct CategoryService<R: CategoryRepository> {
    repository: Arc<R>,
    brands: Arc<dyn BrandRepository>,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repository: R, brands: Arc<dyn BrandRepository>) -> Self {
        Self {
            repository: Arc::new(repository),
            brands,
        }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let parent = match input.parent_id {
            Some(parent_id) => Some(self.load_parent(parent_id).await?),
            None => None,
        };

        let slug = resolve_slug(input.slug.as_deref(), &input.name)?;
        if self
            .repository
            .slug_exists(input.parent_id, slug.clone(), None)
            .await?
        {
            return Err(CatalogError::Conflict(format!(
                "Category slug '{slug}' already exists under this parent"
            )));
        }

        let mut category = Category::new(input, slug, parent.as_ref());
        (category.shipping_type, category.shipping_rate) = resolve_shipping(
            !category.is_main(),
            category.shipping_type,
            category.shipping_rate,
        )?;

        self.repository.create(category).await
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: Uuid) -> CatalogResult<Category> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Category", id))
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self, filter: CategoryFilter) -> CatalogResult<Vec<Category>> {
        self.repository.list(filter).await
    }

    /// Direct children of `id`
    #[instrument(skip(self))]
    pub async fn list_children(&self, id: Uuid) -> CatalogResult<Vec<Category>> {
        self.get_category(id).await?;
        self.repository
            .list(CategoryFilter {
                parent_id: Some(id),
                ..Default::default()
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_tree(&self, active_only: bool) -> CatalogResult<Vec<CategoryNode>> {
        let all = self.repository.list(CategoryFilter::default()).await?;
        Ok(CategoryTree::new(all).nested(active_only))
    }

    /// Partial update. Re-parenting rewrites `path`/`level` for the whole
    /// subtree.
    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategory,
    ) -> CatalogResult<Category> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let mut category = self.get_category(id).await?;
        let parent_changed = input.changes_parent(category.parent_id);

        let new_parent = match input.parent_id {
            Some(Some(parent_id)) if parent_changed => {
                if parent_id == id {
                    return Err(CatalogError::Validation(
                        "A category cannot be its own parent".to_string(),
                    ));
                }
                let parent = self.load_parent(parent_id).await?;
                if parent.path.contains(&id) {
                    return Err(CatalogError::Validation(
                        "A category cannot be moved under its own descendant".to_string(),
                    ));
                }
                Some(parent)
            }
            _ => None,
        };

        if new_parent.is_some() && category.is_main() {
            self.ensure_no_brands(id).await?;
        }

        if let Some(name) = input.name {
            category.name = name;
        }
        if let Some(sort_order) = input.sort_order {
            category.sort_order = sort_order;
        }
        if let Some(status) = input.status {
            category.status = status;
        }

        let slug_changed = input.slug.as_ref().is_some_and(|s| *s != category.slug);
        if let Some(slug) = input.slug {
            category.slug = slug;
        }
        if parent_changed {
            category.reparent(new_parent.as_ref());
        }

        if (slug_changed || parent_changed)
            && self
                .repository
                .slug_exists(category.parent_id, category.slug.clone(), Some(id))
                .await?
        {
            return Err(CatalogError::Conflict(format!(
                "Category slug '{}' already exists under this parent",
                category.slug
            )));
        }

        (category.shipping_type, category.shipping_rate) = resolve_shipping(
            !category.is_main(),
            input.shipping_type.or(category.shipping_type),
            input.shipping_rate.or(category.shipping_rate),
        )?;
        category.updated_at = Utc::now();

        let updated = self.repository.update(category).await?;

        if parent_changed {
            let tree = CategoryTree::new(self.repository.list(CategoryFilter::default()).await?);
            let updates = tree.rebase(&id, &updated.path);
            if !updates.is_empty() {
                let rewritten = self.repository.update_paths(updates).await?;
                tracing::info!(category_id = %id, descendants = rewritten, "Subtree re-parented");
            }
        }

        Ok(updated)
    }

    /// Soft delete archives the category. Hard delete removes it with all
    /// descendants and, for a main category, archives its brands.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: Uuid, hard: bool) -> CatalogResult<()> {
        let mut category = self.get_category(id).await?;

        if !hard {
            category.status = EntityStatus::Archived;
            category.updated_at = Utc::now();
            self.repository.update(category).await?;
            return Ok(());
        }

        let tree = CategoryTree::new(self.repository.list(CategoryFilter::default()).await?);
        let ids = tree.subtree_ids(&id);

        if category.is_main() {
            let (deleted, archived) = futures::try_join!(
                self.repository.delete_many(ids),
                self.brands.archive_by_main_category(id),
            )?;
            tracing::info!(category_id = %id, deleted, brands_archived = archived, "Main category removed");
        } else {
            let deleted = self.repository.delete_many(ids).await?;
            tracing::info!(category_id = %id, deleted, "Category removed");
        }

        Ok(())
    }

    /// Brands must stay scoped to a main category, so one that owns brands
    /// cannot be demoted.
    async fn ensure_no_brands(&self, id: Uuid) -> CatalogResult<()> {
        let owned = self
            .brands
            .list(BrandFilter {
                main_category_id: Some(id),
                status: None,
            })
            .await?;
        if !owned.is_empty() {
            return Err(CatalogError::field(
                "parent_id",
                format!("main category still owns {} brand(s)", owned.len()),
            ));
        }
        Ok(())
    }

    async fn load_parent(&self, parent_id: Uuid) -> CatalogResult<Category> {
        let parent = self
            .repository
            .get_by_id(parent_id)
            .await?
            .ok_or_else(|| CatalogError::field("parent_id", "parent category does not exist"))?;

        if parent.is_archived() {
            return Err(CatalogError::field("parent_id", "parent category is archived"));
        }
        Ok(parent)
    }
}

impl<R: CategoryRepository> Clone for CategoryService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            brands: Arc::clone(&self.brands),
        }
    }
}

/// Client slug if given, otherwise derived from the name.
pub(crate) fn resolve_slug(slug: Option<&str>, name: &str) -> CatalogResult<String> {
    let slug = slug.map(str::to_string).unwrap_or_else(|| slugify(name));
    if slug.is_empty() {
        return Err(CatalogError::field(
            "slug",
            "cannot be derived from the name; provide one",
        ));
    }
    Ok(slug)
}

/// Subcategories must carry both shipping fields with a non-negative rate;
/// main categories never carry them.
pub(crate) fn resolve_shipping(
    is_subcategory: bool,
    shipping_type: Option<ShippingType>,
    shipping_rate: Option<i64>,
) -> CatalogResult<(Option<ShippingType>, Option<i64>)> {
    if !is_subcategory {
        return Ok((None, None));
    }

    let mut fields = FieldErrors::new();
    if shipping_type.is_none() {
        fields.insert(
            "shipping_type".to_string(),
            vec!["required for subcategories".to_string()],
        );
    }
    match shipping_rate {
        None => {
            fields.insert(
                "shipping_rate".to_string(),
                vec!["required for subcategories".to_string()],
            );
        }
        Some(rate) if rate < 0 => {
            fields.insert(
                "shipping_rate".to_string(),
                vec!["must be >= 0".to_string()],
            );
        }
        Some(_) => {}
    }

    if !fields.is_empty() {
        return Err(CatalogError::InvalidFields {
            message: "Subcategories require shipping_type and shipping_rate".to_string(),
            fields,
        });
    }

    Ok((shipping_type, shipping_rate))
}
