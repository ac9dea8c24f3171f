//! Record types - investors and their commitments
//!
//! Two entities with a one-to-many relationship:
//! - `Investor`: a capital source, identified by a store-assigned id
//! - `Commitment`: one pledge of capital by an investor to an asset class
//!
//! `New*` variants carry the fields the loader produces before the store
//! assigns ids. Read models (`InvestorSummary`, `CommitmentListing`) are the
//! shapes the query engine hands back to the HTTP and CLI layers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An investor as stored.
///
/// Serializes to the investor detail shape (no total, includes last-updated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investor {
    pub id: i64,
    pub investor_name: String,
    pub investor_type: String,
    pub investor_country: String,
    pub investor_date_added: NaiveDate,
    pub investor_last_updated: NaiveDate,
}

/// An investor parsed from CSV, not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvestor {
    pub investor_name: String,
    pub investor_type: String,
    pub investor_country: String,
    pub investor_date_added: NaiveDate,
    pub investor_last_updated: NaiveDate,
}

/// A commitment as stored.
///
/// `investor_id` stays internal: the HTTP shape only carries
/// id, asset class, amount and currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Commitment {
    pub id: i64,
    #[serde(skip_serializing)]
    pub investor_id: i64,
    pub asset_class: String,
    pub amount: f64,
    pub currency: String,
}

/// A commitment parsed from CSV, attached to an already-persisted investor
#[derive(Debug, Clone, PartialEq)]
pub struct NewCommitment {
    pub investor_id: i64,
    pub asset_class: String,
    pub amount: f64,
    pub currency: String,
}

/// Investor list row with the aggregated commitment total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorSummary {
    pub id: i64,
    pub investor_name: String,
    pub investor_type: String,
    pub investor_country: String,
    pub investor_date_added: NaiveDate,
    /// Sum of the investor's commitment amounts; 0 when there are none
    pub total_commitment: f64,
}

/// Commitments together with the asset classes a client can filter by.
///
/// For a per-investor listing, `asset_classes` always covers every class the
/// investor holds, even when `commitments` was narrowed by a filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitmentListing {
    pub commitments: Vec<Commitment>,
    pub asset_classes: Vec<String>,
}

impl CommitmentListing {
    /// Total amount across the listed commitments
    pub fn total_amount(&self) -> f64 {
        self.commitments.iter().map(|c| c.amount).sum()
    }
}
