//! Recruiter rollup repository
//!
//! The `recruiters` table caches lifetime totals and the last recruitment
//! time per label. Active counts are never stored: every read joins back to
//! `members` and counts live rows.

use chrono::{DateTime, Utc};
use sqlx::{AnyConnection, AnyPool, FromRow};
use tracing::{debug, instrument};

use crate::db::time;
use crate::error::Result;
use crate::models::{BackfillReport, RecruiterCount, RecruiterLastActivity, RecruiterStats};

#[derive(Debug, FromRow)]
struct CountRow {
    recruiter_label: String,
    active_count: i64,
}

impl From<CountRow> for RecruiterCount {
    fn from(row: CountRow) -> Self {
        Self {
            recruiter_label: row.recruiter_label,
            active_count: row.active_count,
        }
    }
}

#[derive(Debug, FromRow)]
struct StatsRow {
    recruiter_label: String,
    active_count: i64,
    lifetime_count: i64,
    last_recruitment_at: Option<i64>,
    created_at: i64,
}

impl StatsRow {
    fn into_stats(self) -> Result<RecruiterStats> {
        Ok(RecruiterStats {
            recruiter_label: self.recruiter_label,
            active_count: self.active_count,
            lifetime_count: self.lifetime_count,
            last_recruitment_at: time::from_micros_opt(
                "last_recruitment_at",
                self.last_recruitment_at,
            )?,
            created_at: time::from_micros("created_at", self.created_at)?,
        })
    }
}

/// Per-label aggregate over the members table, input to backfill
#[derive(Debug, FromRow)]
struct HistoryRow {
    recruiter_label: String,
    member_count: i64,
    last_registered_at: i64,
    first_registered_at: i64,
}

const STATS_SELECT: &str = r#"
    SELECT
        r.recruiter_label,
        COUNT(m.id) AS active_count,
        r.lifetime_count,
        r.last_recruitment_at,
        r.created_at
    FROM recruiters r
    LEFT JOIN members m ON m.recruiter_label = r.recruiter_label
"#;

const STATS_GROUP: &str = r#"
    GROUP BY r.recruiter_label, r.lifetime_count, r.last_recruitment_at, r.created_at
"#;

/// Credit one recruitment to `recruiter` at `at`.
///
/// Single insert-or-increment statement; the caller owns the transaction.
/// `last_recruitment_at` only moves forward, so registrations committing out
/// of order keep the latest time.
pub(crate) async fn record_recruitment(
    conn: &mut AnyConnection,
    recruiter: &str,
    at: DateTime<Utc>,
) -> Result<()> {
    let micros = time::to_micros(at);
    sqlx::query(
        r#"
        INSERT INTO recruiters (recruiter_label, last_recruitment_at, lifetime_count, created_at)
        VALUES ($1, $2, 1, $3)
        ON CONFLICT (recruiter_label) DO UPDATE SET
            last_recruitment_at = CASE
                WHEN recruiters.last_recruitment_at IS NULL
                  OR recruiters.last_recruitment_at < EXCLUDED.last_recruitment_at
                THEN EXCLUDED.last_recruitment_at
                ELSE recruiters.last_recruitment_at
            END,
            lifetime_count = recruiters.lifetime_count + 1
        "#,
    )
    .bind(recruiter)
    .bind(micros)
    .bind(micros)
    .execute(conn)
    .await?;

    Ok(())
}

/// Recruiter rollup repository
pub struct RecruiterRepo<'a> {
    pool: &'a AnyPool,
}

impl<'a> RecruiterRepo<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// Every known recruiter with its live member count, zero included.
    pub async fn list_with_active_counts(&self) -> Result<Vec<RecruiterCount>> {
        let rows: Vec<CountRow> = sqlx::query_as(
            r#"
            SELECT r.recruiter_label, COUNT(m.id) AS active_count
            FROM recruiters r
            LEFT JOIN members m ON m.recruiter_label = r.recruiter_label
            GROUP BY r.recruiter_label
            ORDER BY r.recruiter_label
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(RecruiterCount::from).collect())
    }

    /// Recruiter labels as they appear in the members table, with counts.
    ///
    /// Unlike [`Self::list_with_active_counts`] this ignores the rollup, so a
    /// label missing here but present there has no live members, and a label
    /// present here but missing there is rollup drift that backfill heals.
    pub async fn list_member_recruiter_counts(&self) -> Result<Vec<RecruiterCount>> {
        let rows: Vec<CountRow> = sqlx::query_as(
            r#"
            SELECT recruiter_label, COUNT(*) AS active_count
            FROM members
            GROUP BY recruiter_label
            ORDER BY recruiter_label
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(RecruiterCount::from).collect())
    }

    /// Recruiters that have recruited at least once
    pub async fn list_last_activity(&self) -> Result<Vec<RecruiterLastActivity>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT recruiter_label, last_recruitment_at
            FROM recruiters
            WHERE last_recruitment_at IS NOT NULL
            ORDER BY recruiter_label
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|(recruiter_label, at)| {
                Ok(RecruiterLastActivity {
                    recruiter_label,
                    last_recruitment_at: time::from_micros("last_recruitment_at", at)?,
                })
            })
            .collect()
    }

    /// Full reporting view, one row per known recruiter
    pub async fn full_stats(&self) -> Result<Vec<RecruiterStats>> {
        let sql = format!("{STATS_SELECT} {STATS_GROUP} ORDER BY r.recruiter_label");
        let rows: Vec<StatsRow> = sqlx::query_as(&sql).fetch_all(self.pool).await?;

        rows.into_iter().map(StatsRow::into_stats).collect()
    }

    /// Reporting row for a single recruiter
    pub async fn stats_for(&self, recruiter: &str) -> Result<Option<RecruiterStats>> {
        let sql = format!("{STATS_SELECT} WHERE r.recruiter_label = $1 {STATS_GROUP}");
        let row: Option<StatsRow> = sqlx::query_as(&sql)
            .bind(recruiter)
            .fetch_optional(self.pool)
            .await?;

        row.map(StatsRow::into_stats).transpose()
    }

    /// Rebuild rollup rows from the members table without regressing them.
    ///
    /// Missing rows are inserted from history. Existing rows only move
    /// forward: `last_recruitment_at` is raised if history has a later one,
    /// `lifetime_count` is raised if history counts more. Members deleted
    /// since the rollup was advanced can therefore never pull it back down,
    /// and running this twice is the same as running it once.
    #[instrument(skip_all)]
    pub async fn backfill_from_history(&self) -> Result<BackfillReport> {
        let mut tx = self.pool.begin().await?;

        let history: Vec<HistoryRow> = sqlx::query_as(
            r#"
            SELECT
                recruiter_label,
                COUNT(*) AS member_count,
                MAX(registered_at) AS last_registered_at,
                MIN(registered_at) AS first_registered_at
            FROM members
            GROUP BY recruiter_label
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        for row in &history {
            sqlx::query(
                r#"
                INSERT INTO recruiters (recruiter_label, last_recruitment_at, lifetime_count, created_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (recruiter_label) DO UPDATE SET
                    last_recruitment_at = CASE
                        WHEN recruiters.last_recruitment_at IS NULL
                          OR recruiters.last_recruitment_at < EXCLUDED.last_recruitment_at
                        THEN EXCLUDED.last_recruitment_at
                        ELSE recruiters.last_recruitment_at
                    END,
                    lifetime_count = CASE
                        WHEN recruiters.lifetime_count < EXCLUDED.lifetime_count
                        THEN EXCLUDED.lifetime_count
                        ELSE recruiters.lifetime_count
                    END
                "#,
            )
            .bind(row.recruiter_label.as_str())
            .bind(row.last_registered_at)
            .bind(row.member_count)
            .bind(row.first_registered_at)
            .execute(&mut *tx)
            .await?;

            debug!(
                recruiter = %row.recruiter_label,
                members = row.member_count,
                "rollup reconciled"
            );
        }

        tx.commit().await?;

        let report = BackfillReport {
            recruiters_scanned: history.len() as u64,
        };
        tracing::info!(recruiters = report.recruiters_scanned, "Rollup backfill complete");
        Ok(report)
    }
}
