//! OpenAPI documentation configuration

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityRequirement, SecurityScheme},
};

/// Declares the identity provider's JWT as the `bearer_auth` scheme and
/// requires it on every operation.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.security = Some(vec![SecurityRequirement::new(
            "bearer_auth",
            Vec::<String>::new(),
        )]);
    }
}

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog Admin API",
        version = "0.1.0",
        description = "Categories, brands, attribute definitions, products and users for the admin panel",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/categories", api = domain_catalog::categories::ApiDoc),
        (path = "/api/brands", api = domain_catalog::brands::ApiDoc),
        (path = "/api/attributes", api = domain_catalog::attributes::ApiDoc),
        (path = "/api/products", api = domain_catalog::products::ApiDoc),
        (path = "/api/users", api = domain_users::ApiDoc),
        (path = "/api/me", api = domain_users::MeApiDoc)
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;
