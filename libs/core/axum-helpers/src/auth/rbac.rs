//! `domain:action` permission strings with wildcard matching.
//!
//! A requirement `categories:update` is satisfied by any of
//! `categories:update`, `categories:*` or `*:*`, or by the `admin` role.

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use super::Principal;
use crate::errors::AppError;

pub const ADMIN_ROLE: &str = "admin";
const WILDCARD: &str = "*";

/// Whether `granted` (plus the role) covers `required`.
///
/// Pure string matching; malformed requirements are never satisfied except
/// through the admin bypass.
pub fn permits(role: Option<&str>, granted: &[String], required: &str) -> bool {
    if role == Some(ADMIN_ROLE) {
        return true;
    }

    let Some((domain, _)) = required.split_once(':') else {
        return false;
    };

    granted.iter().any(|perm| {
        perm == required
            || perm == "*:*"
            || perm
                .split_once(':')
                .is_some_and(|(d, a)| d == domain && a == WILDCARD)
    })
}

/// `domain:action` where each side is `*` or `[a-z0-9_-]+`.
pub fn is_valid_permission(permission: &str) -> bool {
    fn part_ok(part: &str) -> bool {
        part == WILDCARD
            || (!part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'))
    }

    match permission.split_once(':') {
        Some((domain, action)) => part_ok(domain) && part_ok(action),
        None => false,
    }
}

/// CRUD action derived from the HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET | Method::HEAD => Some(Self::Read),
            Method::POST => Some(Self::Create),
            Method::PUT | Method::PATCH => Some(Self::Update),
            Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Middleware state naming the permission domain of a route group.
#[derive(Debug, Clone, Copy)]
pub struct ResourceGuard {
    domain: &'static str,
    read_only: &'static [&'static str],
}

impl ResourceGuard {
    pub const fn new(domain: &'static str) -> Self {
        Self {
            domain,
            read_only: &[],
        }
    }

    /// Paths, relative to the guarded router, that only need `read`
    /// whatever the method (e.g. a POST dry run).
    pub const fn with_read_only(mut self, paths: &'static [&'static str]) -> Self {
        self.read_only = paths;
        self
    }

    pub fn domain(&self) -> &'static str {
        self.domain
    }

    pub fn permission_for(&self, method: &Method, path: &str) -> Option<String> {
        let action = if self.read_only.iter().any(|p| *p == path) {
            Some(Action::Read)
        } else {
            Action::from_method(method)
        };
        action.map(|action| format!("{}:{}", self.domain, action.as_str()))
    }
}

/// Require `<domain>:<action>` for the request method.
///
/// Must run after [`bearer_auth_middleware`](super::bearer_auth_middleware).
/// Methods without a CRUD mapping (OPTIONS) pass through.
pub async fn resource_guard(
    State(guard): State<ResourceGuard>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(required) = guard.permission_for(request.method(), request.uri().path()) else {
        return Ok(next.run(request).await);
    };

    let principal = request
        .extensions()
        .get::<Principal>()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    if !principal.can(&required) {
        tracing::info!(subject = %principal.subject, %required, "Permission denied");
        return Err(AppError::Forbidden(format!("Missing permission {required}")));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_match() {
        let granted = perms(&["categories:read"]);
        assert!(permits(None, &granted, "categories:read"));
        assert!(!permits(None, &granted, "categories:update"));
        assert!(!permits(None, &granted, "brands:read"));
    }

    #[test]
    fn test_domain_wildcard() {
        let granted = perms(&["products:*"]);
        assert!(permits(Some("staff"), &granted, "products:delete"));
        assert!(!permits(Some("staff"), &granted, "users:read"));
    }

    #[test]
    fn test_global_wildcard() {
        let granted = perms(&["*:*"]);
        assert!(permits(None, &granted, "users:delete"));
        assert!(permits(None, &granted, "attributes:create"));
    }

    #[test]
    fn test_admin_bypass() {
        assert!(permits(Some("admin"), &[], "users:delete"));
        assert!(!permits(Some("manager"), &[], "users:delete"));
    }

    #[test]
    fn test_action_wildcard_does_not_span_domains() {
        let granted = perms(&["*:read"]);
        assert!(!permits(None, &granted, "categories:read"));
    }

    #[test]
    fn test_malformed_requirement() {
        assert!(!permits(None, &perms(&["*:*"]), "categories"));
    }

    #[test]
    fn test_is_valid_permission() {
        assert!(is_valid_permission("categories:read"));
        assert!(is_valid_permission("products:*"));
        assert!(is_valid_permission("*:*"));
        assert!(is_valid_permission("sub-categories:bulk_update"));
        assert!(!is_valid_permission("categories"));
        assert!(!is_valid_permission("Categories:read"));
        assert!(!is_valid_permission(":read"));
        assert!(!is_valid_permission("categories:"));
        assert!(!is_valid_permission("a:b:c"));
    }

    #[test]
    fn test_method_mapping() {
        let guard = ResourceGuard::new("brands");
        assert_eq!(guard.permission_for(&Method::GET, "/").as_deref(), Some("brands:read"));
        assert_eq!(guard.permission_for(&Method::HEAD, "/").as_deref(), Some("brands:read"));
        assert_eq!(guard.permission_for(&Method::POST, "/").as_deref(), Some("brands:create"));
        assert_eq!(guard.permission_for(&Method::PUT, "/").as_deref(), Some("brands:update"));
        assert_eq!(guard.permission_for(&Method::PATCH, "/").as_deref(), Some("brands:update"));
        assert_eq!(guard.permission_for(&Method::DELETE, "/").as_deref(), Some("brands:delete"));
        assert_eq!(guard.permission_for(&Method::OPTIONS, "/"), None);
    }

    #[test]
    fn test_read_only_paths() {
        let guard = ResourceGuard::new("attributes").with_read_only(&["/validate"]);
        assert_eq!(
            guard.permission_for(&Method::POST, "/validate").as_deref(),
            Some("attributes:read")
        );
        assert_eq!(
            guard.permission_for(&Method::POST, "/").as_deref(),
            Some("attributes:create")
        );
    }
}
