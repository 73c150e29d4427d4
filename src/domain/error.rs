//! Application error types with proper error chaining.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Query execution failed: {0}")]
    Query(String),
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Duplicate record: {0}")]
    Duplicate(String),
    #[error("Pool exhausted: {0}")]
    PoolExhausted(String),
    #[error("Migration failed: {0}")]
    Migration(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A business rule rejected a field of an otherwise well-formed product.
    #[error("{message}")]
    InvalidField { field: String, message: String },
    /// The request body did not match the expected shape.
    #[error("Validation failed: {0}")]
    Multiple(String),
}

impl ValidationError {
    pub fn invalid_field(field: &str, message: &str) -> Self {
        ValidationError::InvalidField {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Coarse classification used for status mapping and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Duplicate,
    Timeout,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Product ID must be a valid number: {0}")]
    InvalidId(String),
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    #[error("Operation timed out: {0}")]
    Timeout(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) | AppError::InvalidId(_) | AppError::Deserialization(_) => {
                ErrorKind::InvalidInput
            }
            AppError::Database(DatabaseError::NotFound(_)) => ErrorKind::NotFound,
            AppError::Database(DatabaseError::Duplicate(_)) => ErrorKind::Duplicate,
            AppError::Timeout(_) => ErrorKind::Timeout,
            AppError::Database(_) | AppError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Adds operation context to unclassified failures, leaving domain kinds intact.
    #[must_use]
    pub fn context(self, operation: &str) -> Self {
        match self.kind() {
            ErrorKind::Internal => AppError::Internal(format!("failed to {operation}: {self}")),
            _ => self,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(ValidationError::Multiple(err.to_string()))
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted("Pool timed out".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.code().is_some_and(|code| code == "23505") {
                    return DatabaseError::Duplicate(db_err.message().to_string());
                }
                DatabaseError::Query(db_err.message().to_string())
            }
            _ => DatabaseError::Query(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(DatabaseError::Migration(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_conversions() {
        let not_found = DatabaseError::from(sqlx::Error::RowNotFound);
        assert!(matches!(not_found, DatabaseError::NotFound(_)));

        let pool_timeout = DatabaseError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(pool_timeout, DatabaseError::PoolExhausted(_)));

        let generic = DatabaseError::from(sqlx::Error::WorkerCrashed);
        assert!(matches!(generic, DatabaseError::Query(_)));
    }

    #[test]
    fn test_validator_errors_become_shape_failures() {
        use validator::Validate;

        #[derive(Validate)]
        struct TestStruct {
            #[validate(length(min = 1))]
            val: String,
        }

        let s = TestStruct {
            val: "".to_string(),
        };
        let err = s.validate().unwrap_err();
        let app_err = AppError::from(err);

        assert!(matches!(
            app_err,
            AppError::Validation(ValidationError::Multiple(_))
        ));
        assert_eq!(app_err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_invalid_field_displays_bare_message() {
        let err = ValidationError::invalid_field("price", "price must be positive");
        assert_eq!(err.to_string(), "price must be positive");
    }

    #[test]
    fn test_kind_classification() {
        let cases = [
            (
                AppError::Database(DatabaseError::NotFound("1".into())),
                ErrorKind::NotFound,
            ),
            (
                AppError::Database(DatabaseError::Duplicate("name".into())),
                ErrorKind::Duplicate,
            ),
            (
                AppError::Database(DatabaseError::Connection("refused".into())),
                ErrorKind::Internal,
            ),
            (
                AppError::Database(DatabaseError::PoolExhausted("busy".into())),
                ErrorKind::Internal,
            ),
            (AppError::InvalidId("abc".into()), ErrorKind::InvalidInput),
            (AppError::Timeout("get_product".into()), ErrorKind::Timeout),
            (AppError::Internal("boom".into()), ErrorKind::Internal),
        ];

        for (err, expected) in cases {
            assert_eq!(err.kind(), expected, "{err:?}");
        }
    }

    #[test]
    fn test_context_wraps_only_internal_errors() {
        let wrapped = AppError::Database(DatabaseError::Query("syntax error".into()))
            .context("create product");
        match wrapped {
            AppError::Internal(msg) => {
                assert!(msg.starts_with("failed to create product"));
                assert!(msg.contains("syntax error"));
            }
            other => panic!("expected Internal, got {other:?}"),
        }

        let duplicate = AppError::Database(DatabaseError::Duplicate("dup".into()))
            .context("create product");
        assert!(matches!(
            duplicate,
            AppError::Database(DatabaseError::Duplicate(_))
        ));

        let timeout = AppError::Timeout("create_product".into()).context("create product");
        assert!(matches!(timeout, AppError::Timeout(_)));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "HTTP_PORT".to_string(),
            message: "not a number".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for 'HTTP_PORT': not a number");
    }

    #[test]
    fn test_database_error_display() {
        let err = DatabaseError::NotFound("product 7".to_string());
        assert_eq!(err.to_string(), "Record not found: product 7");

        let err = DatabaseError::Duplicate("unique violation".to_string());
        assert_eq!(err.to_string(), "Duplicate record: unique violation");

        let err = DatabaseError::Migration("failed".to_string());
        assert_eq!(err.to_string(), "Migration failed: failed");
    }

    #[test]
    fn test_app_error_from_migrate_error() {
        let mig_err = sqlx::migrate::MigrateError::VersionMissing(1);
        let app_err: AppError = mig_err.into();

        match app_err {
            AppError::Database(DatabaseError::Migration(msg)) => {
                assert!(msg.contains("migration 1 was previously applied"));
            }
            _ => panic!("Expected DatabaseError::Migration, got {:?}", app_err),
        }
    }
}
