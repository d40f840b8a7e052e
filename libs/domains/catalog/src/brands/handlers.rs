//! HTTP handlers for the Brands API

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

use super::models::{Brand, BrandFilter, CreateBrand, UpdateBrand};
use super::repository::BrandRepository;
use super::service::BrandService;
use crate::common::DeleteParams;
use crate::error::CatalogResult;

#[derive(OpenApi)]
#[openapi(
    paths(list_brands, create_brand, get_brand, update_brand, delete_brand),
    components(
        schemas(Brand, CreateBrand, UpdateBrand, BrandFilter),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Brands", description = "Brands scoped to a main category")
    )
)]
pub struct ApiDoc;

pub fn router<R: BrandRepository + 'static>(service: BrandService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_brands).post(create_brand))
        .route(
            "/{id}",
            get(get_brand).patch(update_brand).delete(delete_brand),
        )
        .with_state(shared_service)
}

#[utoipa::path(
    get,
    path = "",
    tag = "Brands",
    params(BrandFilter),
    responses(
        (status = 200, description = "Brands ordered by name", body = Vec<Brand>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_brands<R: BrandRepository>(
    State(service): State<Arc<BrandService<R>>>,
    Query(filter): Query<BrandFilter>,
) -> CatalogResult<Json<Vec<Brand>>> {
    Ok(Json(service.list_brands(filter).await?))
}

#[utoipa::path(
    post,
    path = "",
    tag = "Brands",
    request_body = CreateBrand,
    responses(
        (status = 201, description = "Brand created", body = Brand),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_brand<R: BrandRepository>(
    State(service): State<Arc<BrandService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateBrand>,
) -> CatalogResult<impl IntoResponse> {
    let brand = service.create_brand(input).await?;
    Ok((StatusCode::CREATED, Json(brand)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Brands",
    params(("id" = Uuid, Path, description = "Brand ID")),
    responses(
        (status = 200, description = "Brand found", body = Brand),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_brand<R: BrandRepository>(
    State(service): State<Arc<BrandService<R>>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<Brand>> {
    Ok(Json(service.get_brand(id).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Brands",
    params(("id" = Uuid, Path, description = "Brand ID")),
    request_body = UpdateBrand,
    responses(
        (status = 200, description = "Brand updated", body = Brand),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_brand<R: BrandRepository>(
    State(service): State<Arc<BrandService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateBrand>,
) -> CatalogResult<Json<Brand>> {
    Ok(Json(service.update_brand(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Brands",
    params(
        ("id" = Uuid, Path, description = "Brand ID"),
        DeleteParams
    ),
    responses(
        (status = 204, description = "Brand deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_brand<R: BrandRepository>(
    State(service): State<Arc<BrandService<R>>>,
    UuidPath(id): UuidPath,
    Query(params): Query<DeleteParams>,
) -> CatalogResult<StatusCode> {
    service.delete_brand(id, params.hard).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brands::repository::MockBrandRepository;
    use crate::categories::repository::MockCategoryRepository;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(repo: MockBrandRepository) -> Router {
        router(BrandService::new(
            repo,
            Arc::new(MockCategoryRepository::new()),
        ))
    }

    #[tokio::test]
    async fn test_list_filters_by_main_category() {
        let main = Uuid::now_v7();
        let mut repo = MockBrandRepository::new();
        repo.expect_list()
            .withf(move |f| f.main_category_id == Some(main))
            .returning(|_| Ok(vec![]));

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .uri(format!("/?main_category_id={main}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_hard_delete_missing_is_404() {
        let mut repo = MockBrandRepository::new();
        repo.expect_delete().returning(|_| Ok(false));

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/{}?hard=true", Uuid::now_v7()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
