/// Structured error types for recruitctl-core.
///
/// Lookups that find nothing are not errors: they come back as `Option` or
/// `bool`. Everything that reaches this type is either a rejected write, a
/// bad input, or the backing store failing underneath us.
use sqlx::error::DatabaseError;
use sqlx::postgres::PgDatabaseError;
use sqlx::sqlite::SqliteError;
use thiserror::Error;

use crate::models::ValidationError;

/// Main error type for store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// A write would break the referential or uniqueness rules
    #[error("Constraint violation: {reason}")]
    ConstraintViolation { reason: String },

    /// Connection or transport failure talking to the store
    #[error("Store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// Any other driver error (bad SQL, decode failure, ...)
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Input rejected before touching the store
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Stored timestamp outside the representable range
    #[error("Invalid timestamp in column '{column}': {value}")]
    InvalidTimestamp { column: &'static str, value: i64 },

    /// Connection string names a backend we don't speak
    #[error("Unsupported database URL '{url}' (expected sqlite:// or postgres://)")]
    UnsupportedUrl { url: String },

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Coarse classification callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConstraintViolation,
    StoreUnavailable,
    Invalid,
    Other,
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Create a constraint violation error
    pub fn constraint(reason: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            reason: reason.into(),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
            Self::Unavailable(_) => ErrorKind::StoreUnavailable,
            Self::Validation(_) | Self::UnsupportedUrl { .. } | Self::Config { .. } => {
                ErrorKind::Invalid
            }
            Self::Database(_) | Self::InvalidTimestamp { .. } => ErrorKind::Other,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Unavailable(err),
            sqlx::Error::Database(ref db_err) if is_connection_failure(&**db_err) => {
                Self::Unavailable(err)
            }
            sqlx::Error::Database(ref db_err)
                if db_err.is_foreign_key_violation() || db_err.is_unique_violation() =>
            {
                Self::ConstraintViolation {
                    reason: db_err.message().to_owned(),
                }
            }
            other => Self::Database(other),
        }
    }
}

const SQLITE_CANTOPEN: i32 = 14;
const SQLITE_NOTADB: i32 = 26;

/// Driver errors that mean the store itself can't be reached or opened.
///
/// SQLite reports an unopenable or foreign file as a database error rather
/// than I/O; PostgreSQL uses SQLSTATE class 08 and the 57P0x shutdown codes.
fn is_connection_failure(db_err: &(dyn DatabaseError + 'static)) -> bool {
    if db_err.try_downcast_ref::<SqliteError>().is_some() {
        return db_err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            // Extended result codes carry the primary code in the low byte
            .map_or(false, |code| {
                matches!(code & 0xff, SQLITE_CANTOPEN | SQLITE_NOTADB)
            });
    }

    if let Some(pg_err) = db_err.try_downcast_ref::<PgDatabaseError>() {
        let code = pg_err.code();
        return code.starts_with("08") || matches!(code, "57P01" | "57P02" | "57P03");
    }

    false
}
