use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, FieldErrors};
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User {0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{message}")]
    InvalidFields { message: String, fields: FieldErrors },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            e @ UserError::NotFound(_) => AppError::NotFound(e.to_string()),
            UserError::Conflict(msg) => AppError::Conflict(msg),
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::InvalidFields { message, fields } => {
                AppError::InvalidFields { message, fields }
            }
            UserError::Database(msg) => AppError::Database(msg),
            UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        if let ErrorKind::Write(WriteFailure::WriteError(ref write_error)) = *err.kind {
            if write_error.code == DUPLICATE_KEY {
                return UserError::Conflict("A user with this email already exists".to_string());
            }
        }
        UserError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for UserError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        UserError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (UserError::NotFound("uid-1".into()), StatusCode::NOT_FOUND),
            (UserError::Conflict("dup".into()), StatusCode::CONFLICT),
            (UserError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (UserError::Database("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
