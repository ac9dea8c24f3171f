//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - investors(id, investor_name, investor_type, investor_country, investor_date_added, investor_last_updated)
//! - commitments(id, investor_id, asset_class, amount, currency)

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStore, BatchWriter, DbStats};
