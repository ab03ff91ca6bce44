//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - One `AnyPool`, injected into the store; no global connection string
//! - Portable DML; only table DDL knows which engine it talks to
//! - Recruiter labels link rows by value, not by foreign key; that coupling
//!   stays inside these repositories

pub mod pool;
pub mod repos;
pub mod schema;
pub(crate) mod time;

pub use pool::{create_pool, Backend};
pub use repos::*;
pub use schema::ensure_schema;
