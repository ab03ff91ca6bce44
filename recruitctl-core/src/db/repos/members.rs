//! Member repository
//!
//! - register: member insert + rollup upsert in one transaction
//! - delete/clear: activities go first, then members, same transaction
//! - lookups are exact string matches on the stored label

use sqlx::{AnyPool, FromRow};
use tracing::{debug, instrument};

use super::recruiters::record_recruitment;
use crate::db::time;
use crate::error::Result;
use crate::models::{Label, Member, MemberId};

#[derive(Debug, FromRow)]
struct MemberRow {
    id: i64,
    label: String,
    recruiter_label: String,
    registered_at: i64,
}

impl MemberRow {
    fn into_member(self) -> Result<Member> {
        Ok(Member {
            id: self.id,
            label: self.label,
            recruiter_label: self.recruiter_label,
            registered_at: time::from_micros("registered_at", self.registered_at)?,
        })
    }
}

/// Member repository
pub struct MemberRepo<'a> {
    pool: &'a AnyPool,
}

impl<'a> MemberRepo<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// Register a recruit and credit the recruiter (atomic).
    ///
    /// The rollup row is upserted with a single insert-or-increment
    /// statement, so concurrent registrations under one recruiter can't lose
    /// an increment.
    #[instrument(skip_all, fields(recruiter = %recruiter))]
    pub async fn register(&self, label: &Label, recruiter: &Label) -> Result<Member> {
        let now = time::now();
        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO members (label, recruiter_label, registered_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(label.as_str())
        .bind(recruiter.as_str())
        .bind(time::to_micros(now))
        .fetch_one(&mut *tx)
        .await?;

        record_recruitment(&mut tx, recruiter.as_str(), now).await?;

        tx.commit().await?;
        debug!(member_id = id, "member registered");

        Ok(Member {
            id,
            label: label.as_str().to_owned(),
            recruiter_label: recruiter.as_str().to_owned(),
            registered_at: now,
        })
    }

    /// First registered member carrying this label, if any.
    ///
    /// Labels aren't unique; when one is reused the oldest row wins.
    pub async fn find_by_label(&self, label: &str) -> Result<Option<Member>> {
        let row: Option<MemberRow> = sqlx::query_as(
            r#"
            SELECT id, label, recruiter_label, registered_at
            FROM members
            WHERE label = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(label)
        .fetch_optional(self.pool)
        .await?;

        row.map(MemberRow::into_member).transpose()
    }

    pub async fn find_by_id(&self, id: MemberId) -> Result<Option<Member>> {
        let row: Option<MemberRow> = sqlx::query_as(
            r#"
            SELECT id, label, recruiter_label, registered_at
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(MemberRow::into_member).transpose()
    }

    /// Members credited to a recruiter, oldest registration first
    pub async fn list_by_recruiter(&self, recruiter: &str) -> Result<Vec<Member>> {
        let rows: Vec<MemberRow> = sqlx::query_as(
            r#"
            SELECT id, label, recruiter_label, registered_at
            FROM members
            WHERE recruiter_label = $1
            ORDER BY registered_at, id
            "#,
        )
        .bind(recruiter)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(MemberRow::into_member).collect()
    }

    /// Delete a member and its activities (atomic).
    ///
    /// Returns false, without writing anything, when no member has the
    /// label. The recruiter's lifetime count is left alone.
    #[instrument(skip_all)]
    pub async fn delete(&self, label: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let found: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM members WHERE label = $1 ORDER BY id LIMIT 1")
                .bind(label)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((member_id,)) = found else {
            tx.rollback().await?;
            return Ok(false);
        };

        let activities = sqlx::query("DELETE FROM activities WHERE member_id = $1")
            .bind(member_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(member_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        debug!(member_id, activities, "member deleted");

        Ok(deleted > 0)
    }

    /// Delete every member of a recruiter and reset its lifetime count (atomic).
    ///
    /// `last_recruitment_at` and `created_at` on the rollup row survive.
    #[instrument(skip_all, fields(recruiter = %recruiter))]
    pub async fn clear_recruiter(&self, recruiter: &str) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM activities
            WHERE member_id IN (SELECT id FROM members WHERE recruiter_label = $1)
            "#,
        )
        .bind(recruiter)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM members WHERE recruiter_label = $1")
            .bind(recruiter)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("UPDATE recruiters SET lifetime_count = 0 WHERE recruiter_label = $1")
            .bind(recruiter)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(deleted, "recruiter cleared");

        Ok(deleted)
    }
}
