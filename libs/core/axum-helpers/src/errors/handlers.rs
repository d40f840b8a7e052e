use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::{ErrorCode, ErrorResponse};

/// Router fallback for unknown paths.
pub async fn not_found() -> Response {
    let body = ErrorResponse::new(ErrorCode::RouteNotFound, ErrorCode::RouteNotFound.default_message());
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// Handler for 405 Method Not Allowed.
pub async fn method_not_allowed() -> Response {
    let body = ErrorResponse::new(
        ErrorCode::RouteNotFound,
        "The HTTP method is not allowed for this resource",
    );
    (StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response()
}
