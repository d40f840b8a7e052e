//! Catalog services against a real MongoDB.
//!
//! Run with a local server:
//! `MONGODB_URL=mongodb://localhost:27017 cargo test -p domain_catalog -- --ignored`

use std::sync::Arc;

use domain_catalog::{
    EntityStatus,
    brands::{BrandFilter, BrandRepository, BrandService, CreateBrand, MongoBrandRepository},
    categories::{
        CategoryRepository, CategoryService, CreateCategory, MongoCategoryRepository,
        ShippingType, UpdateCategory,
    },
};
use mongodb::{Client, Database};
use uuid::Uuid;

async fn test_db(name: &str) -> Database {
    let url =
        std::env::var("MONGODB_URL").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let client = Client::with_uri_str(&url).await.unwrap();
    let db = client.database(&format!("catalog_it_{name}_{}", Uuid::now_v7().simple()));
    db.drop().await.unwrap();
    db
}

struct Services {
    db: Database,
    categories: CategoryService<MongoCategoryRepository>,
    brands: BrandService<MongoBrandRepository>,
    brand_repo: MongoBrandRepository,
}

async fn services(name: &str) -> Services {
    let db = test_db(name).await;
    let category_repo = MongoCategoryRepository::new(&db);
    let brand_repo = MongoBrandRepository::new(&db);
    category_repo.init_indexes().await.unwrap();
    brand_repo.init_indexes().await.unwrap();

    let shared_categories: Arc<dyn CategoryRepository> = Arc::new(category_repo.clone());
    let shared_brands: Arc<dyn BrandRepository> = Arc::new(brand_repo.clone());

    Services {
        categories: CategoryService::new(category_repo, shared_brands),
        brands: BrandService::new(brand_repo.clone(), shared_categories),
        brand_repo,
        db,
    }
}

fn category(name: &str, parent_id: Option<Uuid>) -> CreateCategory {
    CreateCategory {
        name: name.to_string(),
        slug: None,
        parent_id,
        sort_order: 0,
        shipping_type: parent_id.map(|_| ShippingType::Flat),
        shipping_rate: parent_id.map(|_| 500),
    }
}

#[tokio::test]
#[ignore] // Requires a running MongoDB
async fn test_reparent_rewrites_stored_paths() {
    let s = services("reparent").await;

    let electronics = s.categories.create_category(category("Electronics", None)).await.unwrap();
    let home = s.categories.create_category(category("Home", None)).await.unwrap();
    let phones = s
        .categories
        .create_category(category("Phones", Some(electronics.id)))
        .await
        .unwrap();
    let smartphones = s
        .categories
        .create_category(category("Smartphones", Some(phones.id)))
        .await
        .unwrap();
    assert_eq!(smartphones.path, vec![electronics.id, phones.id, smartphones.id]);

    s.categories
        .update_category(
            phones.id,
            UpdateCategory {
                parent_id: Some(Some(home.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let moved = s.categories.get_category(smartphones.id).await.unwrap();
    assert_eq!(moved.path, vec![home.id, phones.id, smartphones.id]);
    assert_eq!(moved.level, 3);

    s.db.drop().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires a running MongoDB
async fn test_sibling_slug_conflict_but_cousins_allowed() {
    let s = services("slugs").await;

    let a = s.categories.create_category(category("A", None)).await.unwrap();
    let b = s.categories.create_category(category("B", None)).await.unwrap();

    s.categories
        .create_category(category("Accessories", Some(a.id)))
        .await
        .unwrap();
    s.categories
        .create_category(category("Accessories", Some(b.id)))
        .await
        .unwrap();
    let err = s
        .categories
        .create_category(category("Accessories", Some(a.id)))
        .await
        .unwrap_err();
    assert!(matches!(err, domain_catalog::CatalogError::Conflict(_)));

    s.db.drop().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires a running MongoDB
async fn test_hard_delete_main_archives_brands() {
    let s = services("cascade").await;

    let tools = s.categories.create_category(category("Tools", None)).await.unwrap();
    let drills = s
        .categories
        .create_category(category("Drills", Some(tools.id)))
        .await
        .unwrap();
    let brand = s
        .brands
        .create_brand(CreateBrand {
            name: "Acme".into(),
            slug: None,
            main_category_id: tools.id,
            description: None,
            logo_url: None,
        })
        .await
        .unwrap();

    s.categories.delete_category(tools.id, true).await.unwrap();

    assert!(s.categories.get_category(drills.id).await.is_err());
    let brands = s
        .brand_repo
        .list(BrandFilter {
            main_category_id: Some(tools.id),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(brands.len(), 1);
    assert_eq!(brands[0].id, brand.id);
    assert_eq!(brands[0].status, EntityStatus::Archived);

    s.db.drop().await.unwrap();
}
