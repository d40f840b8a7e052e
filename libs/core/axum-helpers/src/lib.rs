//! # Axum Helpers
//!
//! Shared HTTP plumbing for the admin API.
//!
//! - **[`auth`]**: bearer-token verification and `domain:action` permission checks
//! - **[`server`]**: router assembly with OpenAPI docs, health checks, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: [`AppError`] and the JSON error body
//! - **[`extractors`]**: [`UuidPath`] and [`ValidatedJson`]

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    CurrentPrincipal, JwtConfig, Principal, ResourceGuard, TokenVerifier, bearer_auth_middleware,
    resource_guard,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::{CorsConfig, create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse, FieldErrors};

pub use extractors::{UuidPath, ValidatedJson};
