//! recruitctl-core: recruitment tracking store
//!
//! Members recruited by a recruiter, activity notes per member, and a
//! per-recruiter rollup (lifetime total, last recruitment) kept consistent
//! with the detail tables. Backed by SQLite or PostgreSQL through one
//! implementation, with an in-memory double for tests.

pub mod config;
pub mod db;
pub mod error;
pub mod lookup;
pub mod memory;
pub mod models;
pub mod store;

pub use config::StoreConfig;
pub use error::{ErrorKind, Result, StoreError};
pub use lookup::{candidate_labels, StatsIndex};
pub use memory::MemoryStore;
pub use models::{
    Activity, ActivityDetail, BackfillReport, Label, Member, MemberId, RecruiterCount,
    RecruiterLastActivity, RecruiterStats, ValidationError,
};
pub use store::{RecruitmentStore, SqlStore};
