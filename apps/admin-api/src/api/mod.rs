//! API routes, nested under `/api` by `axum_helpers::create_router`.
//!
//! Every resource group requires a bearer token and the
//! `<resource>:<action>` permission for the request method; `/me` only
//! requires a token.

pub mod catalog;
pub mod health;

use axum::{Router, middleware::from_fn_with_state};
use axum_helpers::{ResourceGuard, TokenVerifier, bearer_auth_middleware, resource_guard};
use domain_users::{MongoUserRepository, UserService, handlers as users};

use catalog::Repositories;

fn guarded(router: Router, guard: ResourceGuard, verifier: &TokenVerifier) -> Router {
    router
        .layer(from_fn_with_state(guard, resource_guard))
        .layer(from_fn_with_state(verifier.clone(), bearer_auth_middleware))
}

pub fn routes(
    catalog: &Repositories,
    users_repository: MongoUserRepository,
    verifier: &TokenVerifier,
) -> Router {
    let user_service = UserService::new(users_repository);

    Router::new()
        .nest(
            "/categories",
            guarded(
                catalog.categories_router(),
                ResourceGuard::new("categories"),
                verifier,
            ),
        )
        .nest(
            "/brands",
            guarded(catalog.brands_router(), ResourceGuard::new("brands"), verifier),
        )
        .nest(
            "/attributes",
            guarded(
                catalog.attributes_router(),
                // dry-run validation writes nothing
                ResourceGuard::new("attributes").with_read_only(&["/validate"]),
                verifier,
            ),
        )
        .nest(
            "/products",
            guarded(
                catalog.products_router(),
                ResourceGuard::new("products"),
                verifier,
            ),
        )
        .nest(
            "/users",
            guarded(
                users::router(user_service.clone()),
                ResourceGuard::new("users"),
                verifier,
            ),
        )
        .nest(
            "/me",
            users::me_router(user_service)
                .layer(from_fn_with_state(verifier.clone(), bearer_auth_middleware)),
        )
}
