//! Database connection pool management
//!
//! One `sqlx::AnyPool` serves both backends. The URL scheme picks the driver;
//! everything above this module speaks the shared SQL subset.

use std::time::Duration;

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};

/// Which engine sits behind the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Local file-backed store
    Sqlite,
    /// Network PostgreSQL
    Postgres,
}

impl Backend {
    /// Detect the backend from a connection string.
    pub fn from_url(url: &str) -> Result<Self> {
        let lower = url.trim().to_ascii_lowercase();
        if lower.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else {
            Err(StoreError::UnsupportedUrl {
                url: url.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
        }
    }
}

/// SQLite URLs without an explicit mode get `mode=rwc` (create if missing)
fn normalize_url(url: &str, backend: Backend) -> String {
    match backend {
        Backend::Sqlite if !url.contains("mode=") && !url.contains(":memory:") => {
            let sep = if url.contains('?') { '&' } else { '?' };
            format!("{}{}mode=rwc", url, sep)
        }
        _ => url.to_string(),
    }
}

fn is_in_memory(url: &str, backend: Backend) -> bool {
    backend == Backend::Sqlite && (url.contains(":memory:") || url.contains("mode=memory"))
}

/// Create a connection pool for the configured store.
///
/// # Errors
///
/// Returns `StoreError::UnsupportedUrl` for unknown schemes and
/// `StoreError::Unavailable` if the first connection can't be made.
///
/// # Example
///
/// ```ignore
/// let (pool, backend) = create_pool(&StoreConfig::with_url("sqlite://recruiter.db")).await?;
/// ```
pub async fn create_pool(config: &StoreConfig) -> Result<(AnyPool, Backend)> {
    let backend = Backend::from_url(&config.database_url)?;
    let url = normalize_url(&config.database_url, backend);

    sqlx::any::install_default_drivers();

    let options = AnyPoolOptions::new()
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));

    // Every in-memory SQLite connection is its own database: pin exactly one
    // and never let the pool recycle it.
    let in_memory = is_in_memory(&url, backend);
    let options = if in_memory {
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        options.max_connections(config.max_connections)
    };

    let pool = options.connect(&url).await?;

    tracing::debug!(
        backend = backend.as_str(),
        in_memory,
        max_connections = if in_memory { 1 } else { config.max_connections },
        "connection pool ready"
    );

    Ok((pool, backend))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_backend_from_scheme() {
        assert_eq!(
            Backend::from_url("sqlite://recruiter.db").unwrap(),
            Backend::Sqlite
        );
        assert_eq!(Backend::from_url("sqlite::memory:").unwrap(), Backend::Sqlite);
        assert_eq!(
            Backend::from_url("postgres://localhost/recruits").unwrap(),
            Backend::Postgres
        );
        assert_eq!(
            Backend::from_url("PostgreSQL://localhost/recruits").unwrap(),
            Backend::Postgres
        );
        assert!(matches!(
            Backend::from_url("mysql://localhost/recruits"),
            Err(StoreError::UnsupportedUrl { .. })
        ));
    }

    #[test]
    fn sqlite_urls_default_to_create_mode() {
        assert_eq!(
            normalize_url("sqlite://recruiter.db", Backend::Sqlite),
            "sqlite://recruiter.db?mode=rwc"
        );
        assert_eq!(
            normalize_url("sqlite://recruiter.db?cache=shared", Backend::Sqlite),
            "sqlite://recruiter.db?cache=shared&mode=rwc"
        );
        assert_eq!(
            normalize_url("sqlite://recruiter.db?mode=ro", Backend::Sqlite),
            "sqlite://recruiter.db?mode=ro"
        );
        assert_eq!(
            normalize_url("postgres://localhost/recruits", Backend::Postgres),
            "postgres://localhost/recruits"
        );
    }

    #[tokio::test]
    async fn pool_acquires_sqlite_connection() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("pool.db").display());

        let (pool, backend) = create_pool(&StoreConfig::with_url(url)).await.unwrap();
        assert_eq!(backend, Backend::Sqlite);

        let result: (i64,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(result.0, 1);
    }

    #[test]
    fn detects_in_memory_sqlite() {
        assert!(is_in_memory("sqlite::memory:", Backend::Sqlite));
        assert!(is_in_memory("sqlite://recruits?mode=memory", Backend::Sqlite));
        assert!(!is_in_memory("sqlite://recruiter.db?mode=rwc", Backend::Sqlite));
    }

    #[tokio::test]
    async fn in_memory_pool_shares_one_database() {
        let (pool, _) = create_pool(&StoreConfig::with_url("sqlite::memory:"))
            .await
            .unwrap();

        sqlx::query("CREATE TABLE scratch (x BIGINT)")
            .execute(&pool)
            .await
            .unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scratch")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(pool.size(), 1);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn pool_acquires_postgres_connection() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let (pool, backend) = create_pool(&StoreConfig::with_url(url)).await.unwrap();
        assert_eq!(backend, Backend::Postgres);

        let result: (i64,) = sqlx::query_as("SELECT 1::bigint")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(result.0, 1);
    }
}
