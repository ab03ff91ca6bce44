//! Store facade shared by every caller
//!
//! The command layer holds one [`RecruitmentStore`] for the life of the
//! process and calls it per user command; nothing here keeps per-call state.

use async_trait::async_trait;
use sqlx::AnyPool;
use tracing::info;

use crate::config::StoreConfig;
use crate::db::{self, ActivityRepo, Backend, MemberRepo, RecruiterRepo};
use crate::error::Result;
use crate::models::{
    Activity, ActivityDetail, BackfillReport, Label, Member, MemberId, RecruiterCount,
    RecruiterLastActivity, RecruiterStats,
};

/// Persistence and aggregation operations for recruitment tracking.
///
/// Absent rows come back as `None`, `false` or an empty `Vec`; errors are
/// reserved for rejected writes and store failures.
#[async_trait]
pub trait RecruitmentStore: Send + Sync {
    /// Create the tables if they don't exist yet
    async fn ensure_schema(&self) -> Result<()>;

    /// Heal the rollup from the members table (monotonic merge)
    async fn backfill_from_history(&self) -> Result<BackfillReport>;

    /// Startup sequence: schema first, then backfill
    async fn prepare(&self) -> Result<BackfillReport> {
        self.ensure_schema().await?;
        self.backfill_from_history().await
    }

    async fn register_member(&self, label: &Label, recruiter: &Label) -> Result<Member>;

    async fn find_member_by_label(&self, label: &str) -> Result<Option<Member>>;

    async fn find_member_by_id(&self, id: MemberId) -> Result<Option<Member>>;

    async fn list_members_by_recruiter(&self, recruiter: &str) -> Result<Vec<Member>>;

    /// Delete a member and its activities; false if the label is unknown
    async fn delete_member(&self, label: &str) -> Result<bool>;

    /// Delete all of a recruiter's members and zero its lifetime count
    async fn clear_recruiter(&self, recruiter: &str) -> Result<u64>;

    async fn add_activity(&self, member_id: MemberId, detail: &ActivityDetail)
        -> Result<Activity>;

    async fn list_activities(&self, member_id: MemberId) -> Result<Vec<Activity>>;

    async fn count_activities(&self, member_id: MemberId) -> Result<u64>;

    async fn list_all_recruiters_with_active_counts(&self) -> Result<Vec<RecruiterCount>>;

    async fn list_member_recruiter_counts(&self) -> Result<Vec<RecruiterCount>>;

    async fn list_recruiters_last_activity(&self) -> Result<Vec<RecruiterLastActivity>>;

    async fn get_full_stats(&self) -> Result<Vec<RecruiterStats>>;

    async fn get_recruiter_stats(&self, recruiter: &str) -> Result<Option<RecruiterStats>>;
}

/// SQL-backed store (SQLite file or PostgreSQL)
#[derive(Clone)]
pub struct SqlStore {
    pool: AnyPool,
    backend: Backend,
}

impl SqlStore {
    /// Wrap an existing pool
    pub fn new(pool: AnyPool, backend: Backend) -> Self {
        Self { pool, backend }
    }

    /// Open a pool for the configured URL
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let (pool, backend) = db::create_pool(config).await?;
        info!(
            backend = backend.as_str(),
            url = %config.redacted_url(),
            "Connected to recruitment store"
        );
        Ok(Self::new(pool, backend))
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn members(&self) -> MemberRepo<'_> {
        MemberRepo::new(&self.pool)
    }

    pub fn activities(&self) -> ActivityRepo<'_> {
        ActivityRepo::new(&self.pool)
    }

    pub fn recruiters(&self) -> RecruiterRepo<'_> {
        RecruiterRepo::new(&self.pool)
    }

    /// Close the pool, waiting for checked-out connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RecruitmentStore for SqlStore {
    async fn ensure_schema(&self) -> Result<()> {
        db::ensure_schema(&self.pool, self.backend).await
    }

    async fn backfill_from_history(&self) -> Result<BackfillReport> {
        self.recruiters().backfill_from_history().await
    }

    async fn register_member(&self, label: &Label, recruiter: &Label) -> Result<Member> {
        self.members().register(label, recruiter).await
    }

    async fn find_member_by_label(&self, label: &str) -> Result<Option<Member>> {
        self.members().find_by_label(label).await
    }

    async fn find_member_by_id(&self, id: MemberId) -> Result<Option<Member>> {
        self.members().find_by_id(id).await
    }

    async fn list_members_by_recruiter(&self, recruiter: &str) -> Result<Vec<Member>> {
        self.members().list_by_recruiter(recruiter).await
    }

    async fn delete_member(&self, label: &str) -> Result<bool> {
        self.members().delete(label).await
    }

    async fn clear_recruiter(&self, recruiter: &str) -> Result<u64> {
        self.members().clear_recruiter(recruiter).await
    }

    async fn add_activity(
        &self,
        member_id: MemberId,
        detail: &ActivityDetail,
    ) -> Result<Activity> {
        self.activities().add(member_id, detail).await
    }

    async fn list_activities(&self, member_id: MemberId) -> Result<Vec<Activity>> {
        self.activities().list(member_id).await
    }

    async fn count_activities(&self, member_id: MemberId) -> Result<u64> {
        self.activities().count(member_id).await
    }

    async fn list_all_recruiters_with_active_counts(&self) -> Result<Vec<RecruiterCount>> {
        self.recruiters().list_with_active_counts().await
    }

    async fn list_member_recruiter_counts(&self) -> Result<Vec<RecruiterCount>> {
        self.recruiters().list_member_recruiter_counts().await
    }

    async fn list_recruiters_last_activity(&self) -> Result<Vec<RecruiterLastActivity>> {
        self.recruiters().list_last_activity().await
    }

    async fn get_full_stats(&self) -> Result<Vec<RecruiterStats>> {
        self.recruiters().full_stats().await
    }

    async fn get_recruiter_stats(&self, recruiter: &str) -> Result<Option<RecruiterStats>> {
        self.recruiters().stats_for(recruiter).await
    }
}
