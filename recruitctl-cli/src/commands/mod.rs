//! Command implementations for the recruitctl CLI
//!
//! Each command takes the store handle and returns the reply text; printing
//! is left to `main`.

pub mod members;
pub mod recruiters;

pub use members::{run_activity, run_delete, run_member, run_register};
pub use recruiters::{run_clear, run_recruiter, run_recruiters, run_staff, run_stats};
