use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Database error: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// The referenced entity does not exist. Carries the entity name so the
    /// HTTP layer can answer "Pet not found" rather than a generic 404.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// An adoption-lifecycle invariant would be violated (surfaced as 400).
    #[error("{0}")]
    Conflict(String),

    /// The resource already exists (surfaced as 409).
    #[error("{0}")]
    Duplicate(String),
}

impl DbError {
    /// Replaces a violation of the named constraint with a domain error,
    /// passing every other sqlx error through untouched.
    pub(crate) fn on_constraint(
        err: sqlx::Error,
        constraint: &str,
        domain_err: impl FnOnce() -> DbError,
    ) -> DbError {
        match &err {
            sqlx::Error::Database(db_err) if db_err.constraint() == Some(constraint) => {
                domain_err()
            }
            _ => DbError::from(err),
        }
    }
}
