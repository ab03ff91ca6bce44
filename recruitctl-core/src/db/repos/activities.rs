//! Activity repository - append-only notes per member

use sqlx::{AnyPool, FromRow};
use tracing::{debug, warn};

use crate::db::time;
use crate::error::{Result, StoreError};
use crate::models::{Activity, ActivityDetail, MemberId};

#[derive(Debug, FromRow)]
struct ActivityRow {
    id: i64,
    member_id: i64,
    detail: String,
    occurred_at: i64,
}

impl ActivityRow {
    fn into_activity(self) -> Result<Activity> {
        Ok(Activity {
            id: self.id,
            member_id: self.member_id,
            detail: self.detail,
            occurred_at: time::from_micros("occurred_at", self.occurred_at)?,
        })
    }
}

/// Activity repository
pub struct ActivityRepo<'a> {
    pool: &'a AnyPool,
}

impl<'a> ActivityRepo<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// Append a note to an existing member.
    ///
    /// The insert is conditional on the member row existing, so an unknown
    /// id fails with `ConstraintViolation` even on a SQLite file opened
    /// without foreign-key enforcement.
    pub async fn add(&self, member_id: MemberId, detail: &ActivityDetail) -> Result<Activity> {
        let now = time::now();

        let inserted: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO activities (member_id, detail, occurred_at)
            SELECT $1, $2, $3
            WHERE EXISTS (SELECT 1 FROM members WHERE id = $4)
            RETURNING id
            "#,
        )
        .bind(member_id)
        .bind(detail.as_str())
        .bind(time::to_micros(now))
        .bind(member_id)
        .fetch_optional(self.pool)
        .await?;

        let Some((id,)) = inserted else {
            warn!(member_id, "activity rejected: member does not exist");
            return Err(StoreError::constraint(format!(
                "member {} does not exist",
                member_id
            )));
        };

        debug!(member_id, activity_id = id, "activity added");
        Ok(Activity {
            id,
            member_id,
            detail: detail.as_str().to_owned(),
            occurred_at: now,
        })
    }

    /// All notes for a member, oldest first
    pub async fn list(&self, member_id: MemberId) -> Result<Vec<Activity>> {
        let rows: Vec<ActivityRow> = sqlx::query_as(
            r#"
            SELECT id, member_id, detail, occurred_at
            FROM activities
            WHERE member_id = $1
            ORDER BY occurred_at, id
            "#,
        )
        .bind(member_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ActivityRow::into_activity).collect()
    }

    /// Number of notes for a member; 0 for unknown ids
    pub async fn count(&self, member_id: MemberId) -> Result<u64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM activities WHERE member_id = $1")
                .bind(member_id)
                .fetch_one(self.pool)
                .await?;

        Ok(count.max(0) as u64)
    }
}
