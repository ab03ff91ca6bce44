//! Domain records returned by the store
//!
//! User-supplied text is validated when building [`Label`] and
//! [`ActivityDetail`]. Records coming back from the store are plain data.

pub mod label;
pub mod validation;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use label::{ActivityDetail, Label, MAX_DETAIL_LEN, MAX_LABEL_LEN};
pub use validation::ValidationError;

/// Surrogate key of a member row
pub type MemberId = i64;

/// A recruited member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub id: MemberId,
    pub label: String,
    pub recruiter_label: String,
    pub registered_at: DateTime<Utc>,
}

/// A timestamped note attached to a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub id: i64,
    pub member_id: MemberId,
    pub detail: String,
    pub occurred_at: DateTime<Utc>,
}

/// Recruiter label with its live member count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecruiterCount {
    pub recruiter_label: String,
    pub active_count: i64,
}

/// Recruiter label with the last time it recruited anyone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecruiterLastActivity {
    pub recruiter_label: String,
    pub last_recruitment_at: DateTime<Utc>,
}

/// Composite reporting row: rollup fields plus the live count.
///
/// `lifetime_count` is the stored counter and is never lowered by member
/// deletion; `active_count` is recomputed from the members table every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecruiterStats {
    pub recruiter_label: String,
    pub active_count: i64,
    pub lifetime_count: i64,
    pub last_recruitment_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a backfill pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Distinct recruiter labels found in the members table
    pub recruiters_scanned: u64,
}
