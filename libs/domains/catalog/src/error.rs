use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, FieldErrors};
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

/// MongoDB duplicate key error code
const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// Per-field failures, e.g. product attributes keyed by attribute key
    #[error("{message}")]
    InvalidFields { message: String, fields: FieldErrors },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Single-field failure rendered with `details`.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.clone()]);
        Self::InvalidFields {
            message: format!("{field}: {message}"),
            fields,
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            e @ CatalogError::NotFound { .. } => AppError::NotFound(e.to_string()),
            CatalogError::Conflict(msg) => AppError::Conflict(msg),
            CatalogError::Validation(msg) => AppError::BadRequest(msg),
            CatalogError::InvalidFields { message, fields } => {
                AppError::InvalidFields { message, fields }
            }
            CatalogError::Database(msg) => AppError::Database(msg),
            CatalogError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        if let ErrorKind::Write(WriteFailure::WriteError(ref write_error)) = *err.kind {
            if write_error.code == DUPLICATE_KEY {
                return CatalogError::Conflict(format!(
                    "Duplicate key: {}",
                    write_error.message
                ));
            }
        }
        CatalogError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for CatalogError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        CatalogError::Internal(err.to_string())
    }
}
