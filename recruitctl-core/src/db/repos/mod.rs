//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - JOIN + GROUP BY for counts (no N+1)
//! - ON CONFLICT upserts for the rollup (no read-then-write)
//! - Transactions for every multi-statement write

pub mod activities;
pub mod members;
pub mod recruiters;

pub use activities::ActivityRepo;
pub use members::MemberRepo;
pub use recruiters::RecruiterRepo;
