//! Bearer-token authentication and permission checks.
//!
//! Tokens are issued by the identity provider; this service only verifies
//! them and reads the `role` and `permissions` claims.
//!
//! ```ignore
//! use axum_helpers::auth::{JwtConfig, TokenVerifier, ResourceGuard, bearer_auth_middleware, resource_guard};
//! use core_config::FromEnv;
//!
//! let verifier = TokenVerifier::new(&JwtConfig::from_env()?);
//!
//! let categories = domain_catalog::categories::handlers::router(service)
//!     .layer(axum::middleware::from_fn_with_state(ResourceGuard::new("categories"), resource_guard))
//!     .layer(axum::middleware::from_fn_with_state(verifier, bearer_auth_middleware));
//! ```

pub mod claims;
pub mod config;
pub mod middleware;
pub mod rbac;

pub use claims::{AccessClaims, Principal, TokenVerifier};
pub use config::JwtConfig;
pub use middleware::{CurrentPrincipal, bearer_auth_middleware, extract_bearer_token};
pub use rbac::{ADMIN_ROLE, Action, ResourceGuard, is_valid_permission, permits, resource_guard};
