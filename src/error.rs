//! Error types for Ledgerly.
//!
//! Every action returns [`Result`]. The HTTP layer renders errors as
//! `{"error": {"code", "message"}}` with a matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

/// Postgres SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// Postgres SQLSTATE for check constraint violations.
const CHECK_VIOLATION: &str = "23514";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Image host error: {0}")]
    ImageHost(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("File too large: max {max_size} bytes")]
    FileTooLarge { max_size: usize },

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Validation(_) | Self::InvalidInput(_) | Self::InvalidFileType(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Llm(_) | Self::ImageHost(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_)
            | Self::Migration(_)
            | Self::Config(_)
            | Self::Mail(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::Conflict(_) => "CONFLICT",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Migration(_) => "MIGRATION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Llm(_) => "LLM_ERROR",
            Self::ImageHost(_) => "IMAGE_HOST_ERROR",
            Self::Mail(_) => "MAIL_ERROR",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::InvalidFileType(_) => "INVALID_FILE_TYPE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Translate a database error for the given resource into a
    /// user-facing error.
    ///
    /// Constraint codes become 409/400 responses instead of opaque 500s.
    pub fn from_db(resource: &str, err: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = err {
            return Self::NotFound(resource.to_string());
        }
        if let Some(db_err) = err.as_database_error() {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return Self::AlreadyExists(resource.to_string()),
                Some(FOREIGN_KEY_VIOLATION) => {
                    return Self::InvalidInput(format!(
                        "{} references a record that does not exist",
                        resource
                    ));
                }
                Some(CHECK_VIOLATION) => {
                    return Self::Validation(format!("{} violates a constraint", resource));
                }
                _ => {}
            }
        }
        Self::Database(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::from_db("Record", err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(crate::validation::describe(&errors))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<lettre::error::Error> for Error {
    fn from(err: lettre::error::Error) -> Self {
        Self::Mail(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for Error {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Self::Mail(err.to_string())
    }
}

impl From<lettre::address::AddressError> for Error {
    fn from(err: lettre::address::AddressError) -> Self {
        Self::InvalidInput(format!("invalid e-mail address: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_becomes_not_found() {
        let err = Error::from_db("Invoice", sqlx::Error::RowNotFound);
        assert!(matches!(err, Error::NotFound(ref r) if r == "Invoice"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Invoice not found");
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(Error::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::AlreadyExists("Product".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(Error::Llm("down".into()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(Error::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::FileTooLarge { max_size: 10 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(Error::Config("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(Error::NotFound("Quote".into()).error_code(), "NOT_FOUND");
        assert_eq!(Error::Validation("bad".into()).error_code(), "VALIDATION_ERROR");
        assert_eq!(Error::ImageHost("bad".into()).error_code(), "IMAGE_HOST_ERROR");
    }
}
