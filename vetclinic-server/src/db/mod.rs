//! Database layer - record store trait, PostgreSQL and in-process stores
//!
//! # Design Principles
//!
//! - Connection pool with bounded size and acquire timeout
//! - Joined listings use JOINs - no N+1 queries
//! - Rely on DB constraints (foreign keys, unique slot index), map violations to errors
//! - One statement per operation, no multi-step transactions

pub mod memory;
pub mod pool;
pub mod postgres;
pub mod schema;
pub mod store;

pub use memory::MemoryRecordStore;
pub use pool::{create_pool, PoolSettings};
pub use postgres::PgRecordStore;
pub use store::{RecordStore, StoreError};
