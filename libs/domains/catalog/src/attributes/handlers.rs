//! HTTP handlers for the Attributes API

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use serde_json::{Map, Value};
use std::sync::Arc;
use utoipa::OpenApi;

use super::models::{
    AttributeConstraints, AttributeDefinition, AttributeFilter, AttributeOption, AttributeType,
    CreateAttribute, ResolveParams, ResolvedAttributes, UpdateAttribute, ValidateAttributes,
};
use super::repository::AttributeRepository;
use super::service::AttributeService;
use crate::common::DeleteParams;
use crate::error::CatalogResult;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_attributes,
        create_attribute,
        resolve_attributes,
        validate_attributes,
        get_attribute,
        update_attribute,
        delete_attribute,
    ),
    components(
        schemas(
            AttributeDefinition, AttributeType, AttributeConstraints, AttributeOption,
            CreateAttribute, UpdateAttribute, AttributeFilter, ResolvedAttributes,
            ValidateAttributes
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
        (name = "Attributes", description = "Attribute definitions and per-category resolution")
    )
)]
pub struct ApiDoc;

pub fn router<R: AttributeRepository + 'static>(service: AttributeService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_attributes).post(create_attribute))
        .route("/resolve", get(resolve_attributes))
        .route("/validate", post(validate_attributes))
        .route(
            "/{id}",
            get(get_attribute)
                .patch(update_attribute)
                .delete(delete_attribute),
        )
        .with_state(shared_service)
}

#[utoipa::path(
    get,
    path = "",
    tag = "Attributes",
    params(AttributeFilter),
    responses(
        (status = 200, description = "Attribute definitions", body = Vec<AttributeDefinition>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_attributes<R: AttributeRepository>(
    State(service): State<Arc<AttributeService<R>>>,
    Query(filter): Query<AttributeFilter>,
) -> CatalogResult<Json<Vec<AttributeDefinition>>> {
    Ok(Json(service.list_attributes(filter).await?))
}

#[utoipa::path(
    post,
    path = "",
    tag = "Attributes",
    request_body = CreateAttribute,
    responses(
        (status = 201, description = "Attribute definition created", body = AttributeDefinition),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_attribute<R: AttributeRepository>(
    State(service): State<Arc<AttributeService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateAttribute>,
) -> CatalogResult<impl IntoResponse> {
    let definition = service.create_attribute(input).await?;
    Ok((StatusCode::CREATED, Json(definition)))
}

/// Definitions a product in the given categories must carry
#[utoipa::path(
    get,
    path = "/resolve",
    tag = "Attributes",
    params(ResolveParams),
    responses(
        (status = 200, description = "Applicable definitions in form order", body = ResolvedAttributes),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn resolve_attributes<R: AttributeRepository>(
    State(service): State<Arc<AttributeService<R>>>,
    Query(params): Query<ResolveParams>,
) -> CatalogResult<Json<ResolvedAttributes>> {
    Ok(Json(
        service
            .resolve(params.main_category_id, params.sub_category_id)
            .await?,
    ))
}

/// Coerce an attribute map without saving anything
#[utoipa::path(
    post,
    path = "/validate",
    tag = "Attributes",
    request_body = ValidateAttributes,
    responses(
        (status = 200, description = "Coerced attribute map", body = Object),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn validate_attributes<R: AttributeRepository>(
    State(service): State<Arc<AttributeService<R>>>,
    ValidatedJson(input): ValidatedJson<ValidateAttributes>,
) -> CatalogResult<Json<Map<String, Value>>> {
    Ok(Json(
        service
            .validate_attributes(
                input.main_category_id,
                input.sub_category_id,
                &input.attributes,
            )
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Attributes",
    params(("id" = Uuid, Path, description = "Attribute definition ID")),
    responses(
        (status = 200, description = "Attribute definition found", body = AttributeDefinition),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_attribute<R: AttributeRepository>(
    State(service): State<Arc<AttributeService<R>>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<AttributeDefinition>> {
    Ok(Json(service.get_attribute(id).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Attributes",
    params(("id" = Uuid, Path, description = "Attribute definition ID")),
    request_body = UpdateAttribute,
    responses(
        (status = 200, description = "Attribute definition updated", body = AttributeDefinition),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_attribute<R: AttributeRepository>(
    State(service): State<Arc<AttributeService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateAttribute>,
) -> CatalogResult<Json<AttributeDefinition>> {
    Ok(Json(service.update_attribute(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Attributes",
    params(
        ("id" = Uuid, Path, description = "Attribute definition ID"),
        DeleteParams
    ),
    responses(
        (status = 204, description = "Attribute definition deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_attribute<R: AttributeRepository>(
    State(service): State<Arc<AttributeService<R>>>,
    UuidPath(id): UuidPath,
    Query(params): Query<DeleteParams>,
) -> CatalogResult<StatusCode> {
    service.delete_attribute(id, params.hard).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::repository::MockAttributeRepository;
    use crate::categories::repository::MockCategoryRepository;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(repo: MockAttributeRepository) -> Router {
        router(AttributeService::new(
            repo,
            Arc::new(MockCategoryRepository::new()),
        ))
    }

    fn definition(key: &str, main: Uuid, required: bool) -> AttributeDefinition {
        AttributeDefinition::new(CreateAttribute {
            key: key.into(),
            label: key.into(),
            value_type: AttributeType::Boolean,
            constraints: AttributeConstraints {
                required,
                ..Default::default()
            },
            main_category_ids: vec![main],
            sub_category_ids: vec![],
            sort_order: 0,
        })
    }

    #[tokio::test]
    async fn test_resolve_endpoint() {
        let main = Uuid::now_v7();
        let def = definition("wireless", main, false);

        let mut repo = MockAttributeRepository::new();
        repo.expect_find_active_for_main()
            .returning(move |_| Ok(vec![def.clone()]));

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .uri(format!("/resolve?main_category_id={main}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["keys"], json!(["wireless"]));
        assert_eq!(body["definitions"][0]["value_type"], "boolean");
    }

    #[tokio::test]
    async fn test_resolve_requires_main_category() {
        let response = app(MockAttributeRepository::new())
            .oneshot(Request::builder().uri("/resolve").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_validate_endpoint_reports_field_errors() {
        let main = Uuid::now_v7();
        let def = definition("wireless", main, true);

        let mut repo = MockAttributeRepository::new();
        repo.expect_find_active_for_main()
            .returning(move |_| Ok(vec![def.clone()]));

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/validate")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({ "main_category_id": main, "attributes": { "wireless": "maybe" } })
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["details"]["wireless"], json!(["expected a boolean"]));
    }
}
