use thiserror::Error;

#[cfg(feature = "sqlite")]
use rusqlite;
#[cfg(feature = "postgres")]
use tokio_postgres;

#[derive(Debug, Error)]
pub enum DbToolsError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] bb8::RunError<tokio_postgres::Error>),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

#[cfg(feature = "sqlite")]
impl From<bb8::RunError<DbToolsError>> for DbToolsError {
    fn from(err: bb8::RunError<DbToolsError>) -> Self {
        match err {
            bb8::RunError::User(inner) => inner,
            bb8::RunError::TimedOut => {
                DbToolsError::ConnectionError("sqlite pool checkout timed out".to_string())
            }
        }
    }
}

/// Coarse classification of a [`DbToolsError`].
///
/// Lets callers tell transient failures (lost connection, locked database)
/// apart from permanent ones (bad SQL, missing table) without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The database could not be reached or the pool could not hand out a connection.
    Connectivity,
    /// The database was busy or locked by another writer.
    Busy,
    /// The database rejected the statement (syntax, constraint, permission, missing object).
    Statement,
    /// Parameters could not be bound to the statement.
    Parameter,
    /// The engine was misconfigured.
    Configuration,
    /// Anything else, including worker-thread failures.
    Internal,
}

impl DbToolsError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            #[cfg(feature = "postgres")]
            DbToolsError::PostgresError(err) => postgres_kind(err),
            #[cfg(feature = "sqlite")]
            DbToolsError::SqliteError(err) => sqlite_kind(err),
            #[cfg(feature = "postgres")]
            DbToolsError::PoolErrorPostgres(_) => ErrorKind::Connectivity,
            DbToolsError::ConfigError(_) => ErrorKind::Configuration,
            DbToolsError::ConnectionError(_) => ErrorKind::Connectivity,
            DbToolsError::ParameterError(_) => ErrorKind::Parameter,
            DbToolsError::ExecutionError(_) => ErrorKind::Internal,
        }
    }

    /// True when running the same call again may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Connectivity | ErrorKind::Busy)
    }
}

#[cfg(feature = "sqlite")]
fn sqlite_kind(err: &rusqlite::Error) -> ErrorKind {
    use rusqlite::ErrorCode;

    match err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => ErrorKind::Busy,
            ErrorCode::CannotOpen | ErrorCode::NotADatabase | ErrorCode::SystemIoFailure => {
                ErrorKind::Connectivity
            }
            _ => ErrorKind::Statement,
        },
        rusqlite::Error::InvalidParameterCount(..)
        | rusqlite::Error::InvalidParameterName(_)
        | rusqlite::Error::ToSqlConversionFailure(_) => ErrorKind::Parameter,
        _ => ErrorKind::Statement,
    }
}

#[cfg(feature = "postgres")]
fn postgres_kind(err: &tokio_postgres::Error) -> ErrorKind {
    if err.is_closed() {
        return ErrorKind::Connectivity;
    }
    match err.code() {
        Some(code) if code.code().starts_with("08") => ErrorKind::Connectivity,
        Some(code) if code.code() == "40001" || code.code() == "40P01" || code.code() == "55P03" => {
            ErrorKind::Busy
        }
        Some(_) => ErrorKind::Statement,
        None => ErrorKind::Connectivity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_local_variants() {
        assert_eq!(
            DbToolsError::ConfigError("x".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            DbToolsError::ParameterError("x".into()).kind(),
            ErrorKind::Parameter
        );
        assert!(DbToolsError::ConnectionError("pool timed out".into()).is_retryable());
        let join = DbToolsError::ExecutionError("join".into());
        assert_eq!(join.kind(), ErrorKind::Internal);
        assert!(!join.is_retryable());
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn classifies_sqlite_failures() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ErrorCode::DatabaseBusy,
                extended_code: rusqlite::ffi::SQLITE_BUSY,
            },
            None,
        );
        let err = DbToolsError::from(busy);
        assert_eq!(err.kind(), ErrorKind::Busy);
        assert!(err.is_retryable());

        let constraint = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ErrorCode::ConstraintViolation,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT,
            },
            Some("UNIQUE constraint failed".into()),
        );
        assert_eq!(DbToolsError::from(constraint).kind(), ErrorKind::Statement);

        let count = rusqlite::Error::InvalidParameterCount(1, 2);
        assert_eq!(DbToolsError::from(count).kind(), ErrorKind::Parameter);
    }
}
