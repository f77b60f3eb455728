use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use database::DbError;
use serde_json::json;
use thiserror::Error;
use tracing;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Authentication failed: {0}")]
    Unauthorized(String),
    #[error("Access denied: {0}")]
    Forbidden(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Token issuance failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

/// Converts our custom `AppError` into an HTTP response.
///
/// NotFound, Conflict and Duplicate are expected outcomes and carry their
/// message to the caller (404/400/409); everything else is logged and
/// answered with a uniform 500 that leaks no internal detail.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(DbError::NotFound(entity)) => {
                (StatusCode::NOT_FOUND, format!("{entity} not found"))
            }
            AppError::Database(DbError::Conflict(message)) => (StatusCode::BAD_REQUEST, message),
            AppError::Database(DbError::Duplicate(message)) => (StatusCode::CONFLICT, message),
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            AppError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Token(err) => {
                tracing::error!(error = ?err, "Token issuance error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
            AppError::PasswordHash(err) => {
                tracing::error!(error = ?err, "Password hashing error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404_with_the_entity_name() {
        let response = AppError::Database(DbError::NotFound("Pet")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn lifecycle_conflicts_map_to_400() {
        let response =
            AppError::Database(DbError::Conflict("Pet has already been adopted".into()))
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn duplicates_map_to_409() {
        let response = AppError::Database(DbError::Duplicate(
            "Candidate has already expressed interest in this pet".into(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn auth_failures_map_to_401_and_403() {
        let unauthorized = AppError::Unauthorized("Access token required".into()).into_response();
        assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);

        let forbidden = AppError::Forbidden("Admins only".into()).into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn unexpected_database_errors_are_opaque_500s() {
        let response = AppError::Database(DbError::ConnectionConfigError(
            "DATABASE_URL must be set.".into(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
