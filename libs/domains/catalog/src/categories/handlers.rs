//! HTTP handlers for the Categories API

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use super::models::{
    Category, CategoryFilter, CategoryNode, CreateCategory, ShippingType, TreeParams,
    UpdateCategory,
};
use super::repository::CategoryRepository;
use super::service::CategoryService;
use crate::common::{DeleteParams, EntityStatus};
use crate::error::CatalogResult;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_categories,
        create_category,
        get_tree,
        get_category,
        update_category,
        delete_category,
        list_children,
    ),
    components(
        schemas(
            Category, CategoryNode, CreateCategory, UpdateCategory,
            CategoryFilter, ShippingType, EntityStatus
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Categories", description = "Category tree management")
    )
)]
pub struct ApiDoc;

pub fn router<R: CategoryRepository + 'static>(service: CategoryService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/tree", get(get_tree))
        .route(
            "/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
        .route("/{id}/children", get(list_children))
        .with_state(shared_service)
}

/// List categories (flat)
#[utoipa::path(
    get,
    path = "",
    tag = "Categories",
    params(CategoryFilter),
    responses(
        (status = 200, description = "Categories ordered by sort_order, name", body = Vec<Category>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    Query(filter): Query<CategoryFilter>,
) -> CatalogResult<Json<Vec<Category>>> {
    Ok(Json(service.list_categories(filter).await?))
}

/// Create a main category or subcategory
#[utoipa::path(
    post,
    path = "",
    tag = "Categories",
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> CatalogResult<impl IntoResponse> {
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Nested category tree
#[utoipa::path(
    get,
    path = "/tree",
    tag = "Categories",
    params(TreeParams),
    responses(
        (status = 200, description = "Main categories with nested children", body = Vec<CategoryNode>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_tree<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    Query(params): Query<TreeParams>,
) -> CatalogResult<Json<Vec<CategoryNode>>> {
    Ok(Json(service.get_tree(params.active_only).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<Category>> {
    Ok(Json(service.get_category(id).await?))
}

/// Partially update a category; `parent_id` moves it with its subtree
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateCategory>,
) -> CatalogResult<Json<Category>> {
    Ok(Json(service.update_category(id, input).await?))
}

/// Archive a category, or remove it with its subtree when `hard=true`
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Categories",
    params(
        ("id" = Uuid, Path, description = "Category ID"),
        DeleteParams
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
    Query(params): Query<DeleteParams>,
) -> CatalogResult<StatusCode> {
    service.delete_category(id, params.hard).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Direct children of a category
#[utoipa::path(
    get,
    path = "/{id}/children",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Parent category ID")),
    responses(
        (status = 200, description = "Direct children", body = Vec<Category>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_children<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<Vec<Category>>> {
    Ok(Json(service.list_children(id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brands::repository::MockBrandRepository;
    use crate::categories::repository::MockCategoryRepository;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(repo: MockCategoryRepository) -> Router {
        router(CategoryService::new(repo, Arc::new(MockBrandRepository::new())))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_returns_201() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_slug_exists().returning(|_, _, _| Ok(false));
        repo.expect_create().returning(Ok);

        let response = app(repo)
            .oneshot(json_request("POST", "/", json!({ "name": "Home & Garden" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["slug"], "home-garden");
        assert_eq!(body["level"], 1);
        assert!(body["parent_id"].is_null());
    }

    #[tokio::test]
    async fn test_create_invalid_slug_is_400() {
        let repo = MockCategoryRepository::new();

        let response = app(repo)
            .oneshot(json_request(
                "POST",
                "/",
                json!({ "name": "Phones", "slug": "Not A Slug" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert!(body["details"]["slug"].is_array());
    }

    #[tokio::test]
    async fn test_get_unknown_is_404() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .uri(format!("/{}", Uuid::now_v7()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_bad_uuid_is_400() {
        let response = app(MockCategoryRepository::new())
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tree_nests_children() {
        let parent = Category::new(
            CreateCategory {
                name: "Electronics".into(),
                slug: None,
                parent_id: None,
                sort_order: 0,
                shipping_type: None,
                shipping_rate: None,
            },
            "electronics".into(),
            None,
        );
        let child = Category::new(
            CreateCategory {
                name: "Phones".into(),
                slug: None,
                parent_id: Some(parent.id),
                sort_order: 0,
                shipping_type: Some(ShippingType::Flat),
                shipping_rate: Some(300),
            },
            "phones".into(),
            Some(&parent),
        );
        let all = vec![child, parent];

        let mut repo = MockCategoryRepository::new();
        repo.expect_list().returning(move |_| Ok(all.clone()));

        let response = app(repo)
            .oneshot(Request::builder().uri("/tree").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["name"], "Electronics");
        assert_eq!(body[0]["children"][0]["name"], "Phones");
        assert_eq!(body[0]["children"][0]["shipping_type"], "flat");
    }

    #[tokio::test]
    async fn test_delete_soft_returns_204() {
        let category = Category::new(
            CreateCategory {
                name: "Toys".into(),
                slug: None,
                parent_id: None,
                sort_order: 0,
                shipping_type: None,
                shipping_rate: None,
            },
            "toys".into(),
            None,
        );
        let id = category.id;

        let mut repo = MockCategoryRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(category.clone())));
        repo.expect_update()
            .withf(|c| c.status == EntityStatus::Archived)
            .returning(Ok);

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/{id}?hard=false"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
