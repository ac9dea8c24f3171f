//! # investor-api - Investor and commitment service
//!
//! Loads investors and their capital commitments from a CSV export into
//! SQLite and serves them through a small read-only HTTP API.
//!
//! investor-api provides:
//! - Typed records for investors and commitments
//! - SQLite-backed storage with an explicit schema
//! - A CSV loader that deduplicates investors by name
//! - A query engine for listings, totals and asset-class filters
//! - An axum server exposing the query engine over HTTP

pub mod model;
pub mod storage;
pub mod loader;
pub mod query;
pub mod server;
pub mod config;
pub mod ui;


// Re-exports for convenient access
pub use model::{Commitment, CommitmentListing, Investor, InvestorSummary, NewCommitment, NewInvestor};
pub use storage::SqliteStore;
pub use loader::{load_csv, LoadReport};
pub use query::QueryEngine;

/// Result type alias for investor-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for investor-api operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error at row {row}, column '{column}': {message}")]
    Parse {
        row: usize,
        column: String,
        message: String,
    },

    #[error("Missing CSV column: {0}")]
    MissingColumn(String),

    #[error("Investor not found: {0}")]
    InvestorNotFound(i64),
}

impl Error {
    /// Whether this error belongs to the load-time parse family
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse { .. } | Error::MissingColumn(_))
    }
}
