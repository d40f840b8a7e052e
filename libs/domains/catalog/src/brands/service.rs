use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::models::{Brand, BrandFilter, CreateBrand, UpdateBrand};
use super::repository::BrandRepository;
use crate::categories::CategoryRepository;
use crate::categories::service::resolve_slug;
use crate::common::EntityStatus;
use crate::error::{CatalogError, CatalogResult};

pub struct BrandService<R: BrandRepository> {
    repository: Arc<R>,
    categories: Arc<dyn CategoryRepository>,
}

impl<R: BrandRepository> BrandService<R> {
    pub fn new(repository: R, categories: Arc<dyn CategoryRepository>) -> Self {
        Self {
            repository: Arc::new(repository),
            categories,
        }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_brand(&self, input: CreateBrand) -> CatalogResult<Brand> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        self.ensure_main_category(input.main_category_id).await?;

        let slug = resolve_slug(input.slug.as_deref(), &input.name)?;
        self.ensure_slug_free(&slug, None).await?;

        self.repository.create(Brand::new(input, slug)).await
    }

    #[instrument(skip(self))]
    pub async fn get_brand(&self, id: Uuid) -> CatalogResult<Brand> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Brand", id))
    }

    #[instrument(skip(self))]
    pub async fn list_brands(&self, filter: BrandFilter) -> CatalogResult<Vec<Brand>> {
        self.repository.list(filter).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_brand(&self, id: Uuid, input: UpdateBrand) -> CatalogResult<Brand> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let mut brand = self.get_brand(id).await?;

        if let Some(main_category_id) = input
            .main_category_id
            .filter(|m| *m != brand.main_category_id)
        {
            self.ensure_main_category(main_category_id).await?;
        }
        if let Some(slug) = input.slug.as_deref().filter(|s| *s != brand.slug) {
            self.ensure_slug_free(slug, Some(id)).await?;
        }

        brand.apply_update(input);
        self.repository.update(brand).await
    }

    /// Archive, or remove when `hard`
    #[instrument(skip(self))]
    pub async fn delete_brand(&self, id: Uuid, hard: bool) -> CatalogResult<()> {
        if hard {
            if !self.repository.delete(id).await? {
                return Err(CatalogError::not_found("Brand", id));
            }
            return Ok(());
        }

        let mut brand = self.get_brand(id).await?;
        brand.apply_update(UpdateBrand {
            status: Some(EntityStatus::Archived),
            ..Default::default()
        });
        self.repository.update(brand).await?;
        Ok(())
    }

    async fn ensure_main_category(&self, id: Uuid) -> CatalogResult<()> {
        match self.categories.get_by_id(id).await? {
            None => Err(CatalogError::field(
                "main_category_id",
                "category does not exist",
            )),
            Some(category) if !category.is_main() => Err(CatalogError::field(
                "main_category_id",
                "must reference a main (level 1) category",
            )),
            Some(category) if category.is_archived() => Err(CatalogError::field(
                "main_category_id",
                "category is archived",
            )),
            Some(_) => Ok(()),
        }
    }

    async fn ensure_slug_free(&self, slug: &str, exclude: Option<Uuid>) -> CatalogResult<()> {
        if self
            .repository
            .slug_exists(slug.to_string(), exclude)
            .await?
        {
            return Err(CatalogError::Conflict(format!(
                "Brand slug '{slug}' already exists"
            )));
        }
        Ok(())
    }
}

impl<R: BrandRepository> Clone for BrandService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            categories: Arc::clone(&self.categories),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brands::repository::MockBrandRepository;
    use crate::categories::models::{Category, CreateCategory, ShippingType};
    use crate::categories::repository::MockCategoryRepository;
    use mockall::predicate::eq;

    fn category(name: &str, parent: Option<&Category>) -> Category {
        Category::new(
            CreateCategory {
                name: name.to_string(),
                slug: None,
                parent_id: parent.map(|p| p.id),
                sort_order: 0,
                shipping_type: parent.map(|_| ShippingType::Free),
                shipping_rate: parent.map(|_| 0),
            },
            name.to_lowercase(),
            parent,
        )
    }

    fn categories_returning(categories: Vec<Category>) -> Arc<dyn CategoryRepository> {
        let mut repo = MockCategoryRepository::new();
        repo.expect_get_by_id()
            .returning(move |id| Ok(categories.iter().find(|c| c.id == id).cloned()));
        Arc::new(repo)
    }

    fn create_input(main_category_id: Uuid) -> CreateBrand {
        CreateBrand {
            name: "Acme Tools".into(),
            slug: None,
            main_category_id,
            description: None,
            logo_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_brand_under_main_category() {
        let main = category("Tools", None);
        let main_id = main.id;

        let mut repo = MockBrandRepository::new();
        repo.expect_slug_exists()
            .with(eq("acme-tools".to_string()), eq(None))
            .returning(|_, _| Ok(false));
        repo.expect_create().returning(Ok);

        let brand = BrandService::new(repo, categories_returning(vec![main]))
            .create_brand(create_input(main_id))
            .await
            .unwrap();

        assert_eq!(brand.slug, "acme-tools");
        assert_eq!(brand.main_category_id, main_id);
        assert_eq!(brand.status, EntityStatus::Active);
    }

    #[tokio::test]
    async fn test_create_brand_rejects_subcategory() {
        let main = category("Tools", None);
        let sub = category("Drills", Some(&main));
        let sub_id = sub.id;

        let mut repo = MockBrandRepository::new();
        repo.expect_create().never();

        let err = BrandService::new(repo, categories_returning(vec![main, sub]))
            .create_brand(create_input(sub_id))
            .await
            .unwrap_err();

        match err {
            CatalogError::InvalidFields { fields, .. } => {
                assert!(fields.contains_key("main_category_id"))
            }
            other => panic!("expected InvalidFields, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_brand_missing_category() {
        let mut repo = MockBrandRepository::new();
        repo.expect_create().never();

        let err = BrandService::new(repo, categories_returning(vec![]))
            .create_brand(create_input(Uuid::now_v7()))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidFields { .. }));
    }

    #[tokio::test]
    async fn test_create_brand_duplicate_slug() {
        let main = category("Tools", None);
        let main_id = main.id;

        let mut repo = MockBrandRepository::new();
        repo.expect_slug_exists().returning(|_, _| Ok(true));
        repo.expect_create().never();

        let err = BrandService::new(repo, categories_returning(vec![main]))
            .create_brand(create_input(main_id))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_slug_excludes_self() {
        let main = category("Tools", None);
        let brand = Brand::new(create_input(main.id), "acme-tools".into());
        let id = brand.id;

        let mut repo = MockBrandRepository::new();
        repo.expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(brand.clone())));
        repo.expect_slug_exists()
            .with(eq("acme".to_string()), eq(Some(id)))
            .times(1)
            .returning(|_, _| Ok(false));
        repo.expect_update().returning(Ok);

        let updated = BrandService::new(repo, categories_returning(vec![main]))
            .update_brand(
                id,
                UpdateBrand {
                    slug: Some("acme".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.slug, "acme");
    }

    #[tokio::test]
    async fn test_soft_delete_archives() {
        let brand = Brand::new(create_input(Uuid::now_v7()), "acme-tools".into());
        let id = brand.id;

        let mut repo = MockBrandRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(brand.clone())));
        repo.expect_update()
            .withf(|b| b.status == EntityStatus::Archived)
            .times(1)
            .returning(Ok);
        repo.expect_delete().never();

        BrandService::new(repo, categories_returning(vec![]))
            .delete_brand(id, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_hard_delete_missing_is_not_found() {
        let mut repo = MockBrandRepository::new();
        repo.expect_delete().returning(|_| Ok(false));

        let err = BrandService::new(repo, categories_returning(vec![]))
            .delete_brand(Uuid::now_v7(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { entity: "Brand", .. }));
    }
}
