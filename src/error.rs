use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::social::repository::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Machine-readable code surfaced in GraphQL error extensions.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound => "NOT_FOUND",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Validation { .. } => "VALIDATION_FAILED",
            AppError::Database(_) | AppError::Pool(_) | AppError::Internal(_) => "INTERNAL",
        }
    }

    pub fn is_internal(&self) -> bool {
        self.code() == "INTERNAL"
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(e) => AppError::Pool(e),
            RepositoryError::Sql(e) => AppError::Database(e),
            RepositoryError::MissingMedia(ids) => AppError::validation(
                "mediaIds",
                format!("Unknown media: {}", ids.join(", ")),
            ),
            RepositoryError::Conflict(msg) => AppError::Internal(msg),
        }
    }
}

impl async_graphql::ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        if self.is_internal() {
            tracing::error!("GraphQL resolver error: {}", self);
        }
        let message = if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let mut err = async_graphql::Error::new(message);
        let mut ext = async_graphql::ErrorExtensionValues::default();
        ext.set("code", self.code());
        if let AppError::Validation { field, .. } = self {
            ext.set("field", *field);
        }
        err.extensions = Some(ext);
        err
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Validation { field, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("{}: {}", field, message),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
