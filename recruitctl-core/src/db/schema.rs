//! Table creation
//!
//! Every statement is `IF NOT EXISTS`, so this runs on each process start.
//! Only the surrogate-key column differs between engines; timestamps are
//! BIGINT microseconds everywhere.

use sqlx::AnyPool;

use super::Backend;
use crate::error::Result;

fn member_table(backend: Backend) -> &'static str {
    match backend {
        Backend::Sqlite => {
            r#"
            CREATE TABLE IF NOT EXISTS members (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                label TEXT NOT NULL,
                recruiter_label TEXT NOT NULL,
                registered_at BIGINT NOT NULL
            )
            "#
        }
        Backend::Postgres => {
            r#"
            CREATE TABLE IF NOT EXISTS members (
                id BIGSERIAL PRIMARY KEY,
                label TEXT NOT NULL,
                recruiter_label TEXT NOT NULL,
                registered_at BIGINT NOT NULL
            )
            "#
        }
    }
}

fn activity_table(backend: Backend) -> &'static str {
    match backend {
        Backend::Sqlite => {
            r#"
            CREATE TABLE IF NOT EXISTS activities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                member_id BIGINT NOT NULL REFERENCES members(id) ON DELETE CASCADE,
                detail TEXT NOT NULL,
                occurred_at BIGINT NOT NULL
            )
            "#
        }
        Backend::Postgres => {
            r#"
            CREATE TABLE IF NOT EXISTS activities (
                id BIGSERIAL PRIMARY KEY,
                member_id BIGINT NOT NULL REFERENCES members(id) ON DELETE CASCADE,
                detail TEXT NOT NULL,
                occurred_at BIGINT NOT NULL
            )
            "#
        }
    }
}

fn recruiter_table(backend: Backend) -> &'static str {
    match backend {
        Backend::Sqlite => {
            r#"
            CREATE TABLE IF NOT EXISTS recruiters (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                recruiter_label TEXT NOT NULL UNIQUE,
                last_recruitment_at BIGINT,
                lifetime_count BIGINT NOT NULL DEFAULT 0,
                created_at BIGINT NOT NULL
            )
            "#
        }
        Backend::Postgres => {
            r#"
            CREATE TABLE IF NOT EXISTS recruiters (
                id BIGSERIAL PRIMARY KEY,
                recruiter_label TEXT NOT NULL UNIQUE,
                last_recruitment_at BIGINT,
                lifetime_count BIGINT NOT NULL DEFAULT 0,
                created_at BIGINT NOT NULL
            )
            "#
        }
    }
}

const INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_members_label ON members(label)",
    "CREATE INDEX IF NOT EXISTS idx_members_recruiter ON members(recruiter_label)",
    "CREATE INDEX IF NOT EXISTS idx_activities_member ON activities(member_id)",
];

/// Create members, activities and recruiters tables if absent
pub async fn ensure_schema(pool: &AnyPool, backend: Backend) -> Result<()> {
    tracing::info!(backend = backend.as_str(), "Ensuring recruitment schema...");

    // Order matters: activities references members
    for ddl in [
        member_table(backend),
        activity_table(backend),
        recruiter_table(backend),
    ] {
        sqlx::query(ddl).execute(pool).await?;
    }

    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }

    tracing::info!("Recruitment schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::db::create_pool;

    async fn sqlite_pool(dir: &tempfile::TempDir) -> AnyPool {
        let url = format!("sqlite://{}", dir.path().join("schema.db").display());
        create_pool(&StoreConfig::with_url(url)).await.unwrap().0
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let pool = sqlite_pool(&dir).await;

        ensure_schema(&pool, Backend::Sqlite).await.unwrap();
        ensure_schema(&pool, Backend::Sqlite).await.unwrap();

        let (tables,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
             AND name IN ('members', 'activities', 'recruiters')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(tables, 3);
    }

    #[tokio::test]
    async fn recruiter_label_is_unique() {
        let dir = tempfile::tempdir().unwrap();
        let pool = sqlite_pool(&dir).await;
        ensure_schema(&pool, Backend::Sqlite).await.unwrap();

        let insert = "INSERT INTO recruiters (recruiter_label, created_at) VALUES ($1, $2)";
        sqlx::query(insert)
            .bind("bob")
            .bind(0_i64)
            .execute(&pool)
            .await
            .unwrap();
        let err = sqlx::query(insert)
            .bind("bob")
            .bind(0_i64)
            .execute(&pool)
            .await
            .unwrap_err();

        let err = crate::error::StoreError::from(err);
        assert_eq!(err.kind(), crate::error::ErrorKind::ConstraintViolation);
    }
}
