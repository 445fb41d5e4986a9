//! Riskflow Store - durable alert and recommendation persistence
//!
//! Two logical tables keyed by transaction identifier: `alerts` and
//! `recommendations` (foreign-keyed to alerts). All writes are idempotent
//! upserts so at-least-once redelivery never duplicates rows. The history
//! fetcher reads short, bounded, most-recent-first windows per subject.

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::AlertStore;
