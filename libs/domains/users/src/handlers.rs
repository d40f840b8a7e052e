//! HTTP handlers for the Users API

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use axum_helpers::{
    CurrentPrincipal, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::models::{
    DeleteParams, SetClaims, UpdateUser, UpsertUser, User, UserFilter, UserPage, UserRole,
    UserStatus,
};
use crate::repository::UserRepository;
use crate::service::UserService;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_users,
        upsert_user,
        get_user,
        update_user,
        set_claims,
        delete_user
    ),
    components(
        schemas(
            User,
            UserRole,
            UserStatus,
            UpsertUser,
            UpdateUser,
            SetClaims,
            UserFilter,
            UserPage
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "Admin-side user records")
    )
)]
pub struct ApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(me),
    components(schemas(User), responses(UnauthorizedResponse, NotFoundResponse))
)]
pub struct MeApiDoc;

/// Management routes, mounted under `/users`
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(upsert_user))
        .route(
            "/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/{id}/claims", put(set_claims))
        .with_state(shared_service)
}

/// `GET /` for the authenticated caller, mounted under `/me`
pub fn me_router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    Router::new()
        .route("/", get(me))
        .with_state(Arc::new(service))
}

#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    params(UserFilter),
    responses(
        (status = 200, description = "Page of users, newest first", body = UserPage),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Query(filter): Query<UserFilter>,
) -> UserResult<Json<UserPage>> {
    Ok(Json(service.list_users(filter).await?))
}

#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = UpsertUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 200, description = "Existing user refreshed", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn upsert_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<UpsertUser>,
) -> UserResult<impl IntoResponse> {
    let (user, created) = service.upsert_user(input).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(user)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "Identity-provider uid")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<String>,
) -> UserResult<Json<User>> {
    Ok(Json(service.get_user(&id).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "Identity-provider uid")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<User>> {
    Ok(Json(service.update_user(&id, input).await?))
}

#[utoipa::path(
    put,
    path = "/{id}/claims",
    tag = "Users",
    params(("id" = String, Path, description = "Identity-provider uid")),
    request_body = SetClaims,
    responses(
        (status = 200, description = "Role and permissions replaced", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn set_claims<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<SetClaims>,
) -> UserResult<Json<User>> {
    Ok(Json(service.set_claims(&id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "Identity-provider uid"),
        DeleteParams
    ),
    responses(
        (status = 204, description = "User disabled or removed"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> UserResult<StatusCode> {
    service.delete_user(&id, params.hard).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    responses(
        (status = 200, description = "Record of the token subject", body = User),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn me<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> UserResult<Json<User>> {
    Ok(Json(service.me(&principal.subject).await?))
}
