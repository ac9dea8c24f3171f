//! Query engine implementation
//!
//! Provides the read-only operations behind the API:
//! - Investor listing with aggregated commitment totals
//! - Investor lookup by id
//! - Per-investor commitments with an optional asset-class filter
//! - Store-wide commitments and distinct asset classes
//!
//! Nothing here mutates the store.

use tracing::debug;
use crate::{Error, Result};
use crate::model::{CommitmentListing, Investor, InvestorSummary};
use crate::storage::{DbStats, SqliteStore};

/// Query engine over a borrowed store
pub struct QueryEngine<'a> {
    store: &'a SqliteStore,
}

impl<'a> QueryEngine<'a> {
    /// Create a new query engine
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// All investors in insertion order, each with its total commitment
    pub fn list_investors(&self) -> Result<Vec<InvestorSummary>> {
        self.store.list_investor_summaries()
    }

    /// Look up one investor; absence is not an error
    pub fn get_investor(&self, id: i64) -> Result<Option<Investor>> {
        self.store.get_investor(id)
    }

    /// Look up one investor, failing with [`Error::InvestorNotFound`] if absent
    pub fn require_investor(&self, id: i64) -> Result<Investor> {
        self.get_investor(id)?.ok_or(Error::InvestorNotFound(id))
    }

    /// Commitments of one investor, optionally narrowed to a single asset class.
    ///
    /// The filter is an exact string match. An empty filter counts as no
    /// filter. The returned asset classes always cover every class the
    /// investor holds, so a client can offer the other filters.
    pub fn list_commitments_for_investor(&self, investor_id: i64, asset_class: Option<&str>) -> Result<CommitmentListing> {
        let filter = asset_class.filter(|class| !class.is_empty());
        debug!("Commitments for investor {} (asset_class: {:?})", investor_id, filter);

        let commitments = self.store.find_commitments_by_investor(investor_id, filter)?;
        let asset_classes = self.store.distinct_asset_classes(Some(investor_id))?;

        Ok(CommitmentListing { commitments, asset_classes })
    }

    /// Like [`Self::list_commitments_for_investor`], but checks the investor exists first
    pub fn investor_commitments(&self, investor_id: i64, asset_class: Option<&str>) -> Result<CommitmentListing> {
        self.require_investor(investor_id)?;
        self.list_commitments_for_investor(investor_id, asset_class)
    }

    /// Every commitment in the store plus every asset class
    pub fn list_all_commitments(&self) -> Result<CommitmentListing> {
        Ok(CommitmentListing {
            commitments: self.store.all_commitments()?,
            asset_classes: self.store.distinct_asset_classes(None)?,
        })
    }

    /// Distinct asset classes across the store
    pub fn list_asset_classes(&self) -> Result<Vec<String>> {
        self.store.distinct_asset_classes(None)
    }

    /// Row counts and totals
    pub fn stats(&self) -> Result<DbStats> {
        self.store.stats()
    }
}
