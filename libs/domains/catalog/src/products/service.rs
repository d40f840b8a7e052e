use axum_helpers::FieldErrors;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::models::{CreateProduct, Product, ProductFilter, ProductPage, ProductStatus, UpdateProduct};
use super::repository::ProductRepository;
use crate::attributes::{AttributeRepository, validate_attribute_map};
use crate::brands::BrandRepository;
use crate::categories::CategoryRepository;
use crate::categories::service::resolve_slug;
use crate::common::{EntityStatus, clamp_limit};
use crate::error::{CatalogError, CatalogResult};

/// Products reference categories and brands and carry attributes checked
/// against the definitions resolved for their categories.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    categories: Arc<dyn CategoryRepository>,
    brands: Arc<dyn BrandRepository>,
    attributes: Arc<dyn AttributeRepository>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(
        repository: R,
        categories: Arc<dyn CategoryRepository>,
        brands: Arc<dyn BrandRepository>,
        attributes: Arc<dyn AttributeRepository>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            categories,
            brands,
            attributes,
        }
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_product(&self, input: CreateProduct) -> CatalogResult<Product> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        self.check_references(input.main_category_id, input.sub_category_id, input.brand_id)
            .await?;

        let slug = resolve_slug(input.slug.as_deref(), &input.title)?;
        self.ensure_slug_free(&slug, None).await?;

        let attributes = validate_attribute_map(
            self.attributes.as_ref(),
            input.main_category_id,
            input.sub_category_id,
            &input.attributes,
        )
        .await?;

        self.repository
            .create(Product::new(input, slug, attributes))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> CatalogResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Product", id))
    }

    /// Look up by UUID, falling back to slug
    #[instrument(skip(self))]
    pub async fn get_product_by_ref(&self, id_or_slug: &str) -> CatalogResult<Product> {
        if let Ok(id) = Uuid::parse_str(id_or_slug) {
            return self.get_product(id).await;
        }
        self.repository
            .get_by_slug(id_or_slug.to_string())
            .await?
            .ok_or_else(|| CatalogError::not_found("Product", id_or_slug))
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: ProductFilter) -> CatalogResult<ProductPage> {
        let limit = clamp_limit(filter.limit);
        let offset = filter.offset;

        let (items, total) = futures::try_join!(
            self.repository.list(filter.clone()),
            self.repository.count(filter),
        )?;

        Ok(ProductPage {
            items,
            total,
            limit,
            offset,
        })
    }

    /// Partial update. References are re-checked on the merged product;
    /// attributes are re-validated when they or the categories change.
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: Uuid, input: UpdateProduct) -> CatalogResult<Product> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let mut product = self.get_product(id).await?;

        if let Some(slug) = input.slug.as_deref().filter(|s| *s != product.slug) {
            self.ensure_slug_free(slug, Some(id)).await?;
        }

        let touches_attributes = input.touches_attributes();
        product.apply_update(input);

        self.check_references(
            product.main_category_id,
            product.sub_category_id,
            product.brand_id,
        )
        .await?;

        if touches_attributes {
            product.attributes = validate_attribute_map(
                self.attributes.as_ref(),
                product.main_category_id,
                product.sub_category_id,
                &product.attributes,
            )
            .await?;
        }

        self.repository.update(product).await
    }

    /// Archive, or remove when `hard`
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid, hard: bool) -> CatalogResult<()> {
        if hard {
            if !self.repository.delete(id).await? {
                return Err(CatalogError::not_found("Product", id));
            }
            return Ok(());
        }

        let mut product = self.get_product(id).await?;
        product.apply_update(UpdateProduct {
            status: Some(ProductStatus::Archived),
            ..Default::default()
        });
        self.repository.update(product).await?;
        Ok(())
    }

    /// Main must be an active level-1 category, sub a child of main, and
    /// the brand scoped to main. All failures are reported together.
    async fn check_references(
        &self,
        main: Uuid,
        sub: Option<Uuid>,
        brand: Option<Uuid>,
    ) -> CatalogResult<()> {
        let mut errors = FieldErrors::new();
        let mut push = |field: &str, message: &str| {
            errors
                .entry(field.to_string())
                .or_default()
                .push(message.to_string());
        };

        match self.categories.get_by_id(main).await? {
            None => push("main_category_id", "category does not exist"),
            Some(category) if !category.is_main() => {
                push("main_category_id", "must reference a main (level 1) category")
            }
            Some(category) if category.is_archived() => {
                push("main_category_id", "category is archived")
            }
            Some(_) => {}
        }

        if let Some(sub) = sub {
            match self.categories.get_by_id(sub).await? {
                None => push("sub_category_id", "category does not exist"),
                Some(category) if category.parent_id != Some(main) => {
                    push("sub_category_id", "must be a child of the main category")
                }
                Some(category) if category.is_archived() => {
                    push("sub_category_id", "category is archived")
                }
                Some(_) => {}
            }
        }

        if let Some(brand) = brand {
            match self.brands.get_by_id(brand).await? {
                None => push("brand_id", "brand does not exist"),
                Some(b) if b.main_category_id != main => {
                    push("brand_id", "brand belongs to a different main category")
                }
                Some(b) if b.status == EntityStatus::Archived => {
                    push("brand_id", "brand is archived")
                }
                Some(_) => {}
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::InvalidFields {
                message: "Invalid product references".to_string(),
                fields: errors,
            })
        }
    }

    async fn ensure_slug_free(&self, slug: &str, exclude: Option<Uuid>) -> CatalogResult<()> {
        if self
            .repository
            .slug_exists(slug.to_string(), exclude)
            .await?
        {
            return Err(CatalogError::Conflict(format!(
                "Product slug '{slug}' already exists"
            )));
        }
        Ok(())
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            categories: Arc::clone(&self.categories),
            brands: Arc::clone(&self.brands),
            attributes: Arc::clone(&self.attributes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::models::{AttributeConstraints, AttributeDefinition, AttributeType, CreateAttribute};
    use crate::attributes::repository::MockAttributeRepository;
    use crate::brands::models::{Brand, CreateBrand};
    use crate::brands::repository::MockBrandRepository;
    use crate::categories::models::{Category, CreateCategory, ShippingType};
    use crate::categories::repository::MockCategoryRepository;
    use crate::products::repository::MockProductRepository;
    use mockall::predicate::eq;
    use serde_json::{Map, Value, json};

    struct Fixture {
        electronics: Category,
        phones: Category,
        home: Category,
        sofas: Category,
        pixel: Brand,
        ikea: Brand,
        definitions: Vec<AttributeDefinition>,
    }

    fn category(name: &str, parent: Option<&Category>) -> Category {
        Category::new(
            CreateCategory {
                name: name.to_string(),
                slug: None,
                parent_id: parent.map(|p| p.id),
                sort_order: 0,
                shipping_type: parent.map(|_| ShippingType::PerItem),
                shipping_rate: parent.map(|_| 499),
            },
            name.to_lowercase(),
            parent,
        )
    }

    fn brand(name: &str, main: &Category) -> Brand {
        Brand::new(
            CreateBrand {
                name: name.into(),
                slug: None,
                main_category_id: main.id,
                description: None,
                logo_url: None,
            },
            name.to_lowercase(),
        )
    }

    fn fixture() -> Fixture {
        let electronics = category("Electronics", None);
        let phones = category("Phones", Some(&electronics));
        let home = category("Home", None);
        let sofas = category("Sofas", Some(&home));
        let pixel = brand("Pixel", &electronics);
        let ikea = brand("Ikea", &home);

        let storage = AttributeDefinition::new(CreateAttribute {
            key: "storage_gb".into(),
            label: "Storage".into(),
            value_type: AttributeType::Number,
            constraints: AttributeConstraints {
                required: true,
                min: Some(1.0),
                ..Default::default()
            },
            main_category_ids: vec![electronics.id],
            sub_category_ids: vec![Some(phones.id)],
            sort_order: 0,
        });

        Fixture {
            electronics,
            phones,
            home,
            sofas,
            pixel,
            ikea,
            definitions: vec![storage],
        }
    }

    fn service(f: &Fixture, products: MockProductRepository) -> ProductService<MockProductRepository> {
        let all_categories = vec![
            f.electronics.clone(),
            f.phones.clone(),
            f.home.clone(),
            f.sofas.clone(),
        ];
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_get_by_id()
            .returning(move |id| Ok(all_categories.iter().find(|c| c.id == id).cloned()));

        let all_brands = vec![f.pixel.clone(), f.ikea.clone()];
        let mut brands = MockBrandRepository::new();
        brands
            .expect_get_by_id()
            .returning(move |id| Ok(all_brands.iter().find(|b| b.id == id).cloned()));

        let definitions = f.definitions.clone();
        let mut attributes = MockAttributeRepository::new();
        attributes.expect_find_active_for_main().returning(move |main| {
            Ok(definitions
                .iter()
                .filter(|d| d.main_category_ids.contains(&main))
                .cloned()
                .collect())
        });

        ProductService::new(
            products,
            Arc::new(categories),
            Arc::new(brands),
            Arc::new(attributes),
        )
    }

    fn create_input(f: &Fixture, attributes: Value) -> CreateProduct {
        CreateProduct {
            title: "Pixel 9 Pro".into(),
            slug: None,
            description: None,
            price: 99_900,
            stock: 10,
            status: ProductStatus::Active,
            main_category_id: f.electronics.id,
            sub_category_id: Some(f.phones.id),
            brand_id: Some(f.pixel.id),
            attributes: attributes.as_object().cloned().unwrap_or_default(),
            images: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_coerces_attributes() {
        let f = fixture();
        let mut repo = MockProductRepository::new();
        repo.expect_slug_exists()
            .with(eq("pixel-9-pro".to_string()), eq(None))
            .returning(|_, _| Ok(false));
        repo.expect_create().returning(Ok);

        let product = service(&f, repo)
            .create_product(create_input(&f, json!({ "storage_gb": "256", "junk": true })))
            .await
            .unwrap();

        assert_eq!(product.slug, "pixel-9-pro");
        assert_eq!(product.title_lower, "pixel 9 pro");
        assert_eq!(product.attributes.get("storage_gb"), Some(&json!(256)));
        assert!(product.attributes.get("junk").is_none());
    }

    #[tokio::test]
    async fn test_create_missing_required_attribute() {
        let f = fixture();
        let mut repo = MockProductRepository::new();
        repo.expect_slug_exists().returning(|_, _| Ok(false));
        repo.expect_create().never();

        let err = service(&f, repo)
            .create_product(create_input(&f, json!({})))
            .await
            .unwrap_err();

        match err {
            CatalogError::InvalidFields { fields, .. } => {
                assert_eq!(fields["storage_gb"], vec!["is required".to_string()])
            }
            other => panic!("expected InvalidFields, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_mismatched_references() {
        let f = fixture();
        let mut repo = MockProductRepository::new();
        repo.expect_create().never();

        let mut input = create_input(&f, json!({ "storage_gb": 64 }));
        input.sub_category_id = Some(f.sofas.id);
        input.brand_id = Some(f.ikea.id);

        let err = service(&f, repo).create_product(input).await.unwrap_err();
        match err {
            CatalogError::InvalidFields { fields, .. } => {
                assert!(fields.contains_key("sub_category_id"));
                assert!(fields.contains_key("brand_id"));
                assert!(!fields.contains_key("main_category_id"));
            }
            other => panic!("expected InvalidFields, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_archived_brand() {
        let mut f = fixture();
        f.pixel.status = EntityStatus::Archived;
        let mut repo = MockProductRepository::new();
        repo.expect_create().never();

        let mut input = create_input(&f, json!({ "storage_gb": 64 }));
        input.brand_id = Some(f.pixel.id);

        let err = service(&f, repo).create_product(input).await.unwrap_err();
        match err {
            CatalogError::InvalidFields { fields, .. } => {
                assert_eq!(fields["brand_id"], vec!["brand is archived".to_string()]);
                assert!(!fields.contains_key("main_category_id"));
            }
            other => panic!("expected InvalidFields, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_requires_main_category() {
        let f = fixture();
        let mut repo = MockProductRepository::new();
        repo.expect_create().never();

        let mut input = create_input(&f, json!({}));
        input.main_category_id = f.phones.id;
        input.sub_category_id = None;
        input.brand_id = None;

        let err = service(&f, repo).create_product(input).await.unwrap_err();
        match err {
            CatalogError::InvalidFields { fields, .. } => {
                assert!(fields.contains_key("main_category_id"))
            }
            other => panic!("expected InvalidFields, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_moving_category_revalidates_attributes() {
        let f = fixture();
        let existing = Product::new(
            create_input(&f, json!({})),
            "pixel-9-pro".into(),
            json!({ "storage_gb": 128 }).as_object().cloned().unwrap(),
        );
        let id = existing.id;

        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_update().returning(Ok);

        // Home has no definitions, so storage_gb is dropped
        let updated = service(&f, repo)
            .update_product(
                id,
                UpdateProduct {
                    main_category_id: Some(f.home.id),
                    sub_category_id: Some(Some(f.sofas.id)),
                    brand_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.main_category_id, f.home.id);
        assert!(updated.attributes.is_empty());
        assert!(updated.brand_id.is_none());
    }

    #[tokio::test]
    async fn test_update_price_keeps_attributes() {
        let f = fixture();
        let existing = Product::new(
            create_input(&f, json!({})),
            "pixel-9-pro".into(),
            json!({ "storage_gb": 128 }).as_object().cloned().unwrap(),
        );
        let id = existing.id;

        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_update().returning(Ok);

        let updated = service(&f, repo)
            .update_product(
                id,
                UpdateProduct {
                    price: Some(89_900),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, 89_900);
        assert_eq!(updated.attributes.get("storage_gb"), Some(&json!(128)));
    }

    #[tokio::test]
    async fn test_get_by_slug_fallback() {
        let f = fixture();
        let product = Product::new(create_input(&f, json!({})), "pixel-9-pro".into(), Map::new());

        let mut repo = MockProductRepository::new();
        repo.expect_get_by_slug()
            .with(eq("pixel-9-pro".to_string()))
            .returning(move |_| Ok(Some(product.clone())));
        repo.expect_get_by_id().never();

        let found = service(&f, repo)
            .get_product_by_ref("pixel-9-pro")
            .await
            .unwrap();
        assert_eq!(found.slug, "pixel-9-pro");
    }

    #[tokio::test]
    async fn test_list_returns_page() {
        let f = fixture();
        let mut repo = MockProductRepository::new();
        repo.expect_list()
            .withf(|filter| filter.search.as_deref() == Some("pixel"))
            .returning(|_| Ok(vec![]));
        repo.expect_count().returning(|_| Ok(42));

        let page = service(&f, repo)
            .list_products(ProductFilter {
                search: Some("pixel".into()),
                limit: Some(1000),
                offset: 20,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 42);
        assert_eq!(page.limit, 200);
        assert_eq!(page.offset, 20);
    }

    #[tokio::test]
    async fn test_soft_delete_archives() {
        let f = fixture();
        let product = Product::new(create_input(&f, json!({})), "pixel".into(), Map::new());
        let id = product.id;

        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(product.clone())));
        repo.expect_update()
            .withf(|p| p.status == ProductStatus::Archived)
            .times(1)
            .returning(Ok);

        service(&f, repo).delete_product(id, false).await.unwrap();
    }
}
