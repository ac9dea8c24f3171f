//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use tracing::debug;
use crate::Result;
use crate::model::{Commitment, Investor, InvestorSummary, NewCommitment, NewInvestor};
use super::schema;

const INVESTOR_COLUMNS: &str =
    "id, investor_name, investor_type, investor_country, investor_date_added, investor_last_updated";

const COMMITMENT_COLUMNS: &str = "id, investor_id, asset_class, amount, currency";

/// SQLite-backed storage for investors and commitments.
///
/// One store wraps one connection. Dropping the store closes it, so a store
/// opened per request is released on every exit path.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Investor Operations ==========

    /// Get an investor by id
    pub fn get_investor(&self, id: i64) -> Result<Option<Investor>> {
        let sql = format!("SELECT {INVESTOR_COLUMNS} FROM investors WHERE id = ?1");
        self.conn
            .query_row(&sql, [id], row_to_investor)
            .optional()
            .map_err(Into::into)
    }

    /// List every investor with the sum of its commitment amounts.
    ///
    /// Investors without commitments get a total of 0, not NULL.
    pub fn list_investor_summaries(&self) -> Result<Vec<InvestorSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT i.id, i.investor_name, i.investor_type, i.investor_country, i.investor_date_added,
                   COALESCE(SUM(c.amount), 0.0) AS total_commitment
            FROM investors i
            LEFT OUTER JOIN commitments c ON c.investor_id = i.id
            GROUP BY i.id
            ORDER BY i.id
            "#,
        )?;

        let summaries = stmt
            .query_map([], |row| {
                Ok(InvestorSummary {
                    id: row.get(0)?,
                    investor_name: row.get(1)?,
                    investor_type: row.get(2)?,
                    investor_country: row.get(3)?,
                    investor_date_added: row.get(4)?,
                    total_commitment: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(summaries)
    }

    /// Count all investors
    pub fn count_investors(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM investors", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Commitment Operations ==========

    /// Find commitments owned by an investor, optionally restricted to one asset class
    pub fn find_commitments_by_investor(&self, investor_id: i64, asset_class: Option<&str>) -> Result<Vec<Commitment>> {
        let commitments = match asset_class {
            Some(class) => {
                let sql = format!(
                    "SELECT {COMMITMENT_COLUMNS} FROM commitments WHERE investor_id = ?1 AND asset_class = ?2 ORDER BY id"
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(params![investor_id, class], row_to_commitment)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            None => {
                let sql = format!("SELECT {COMMITMENT_COLUMNS} FROM commitments WHERE investor_id = ?1 ORDER BY id");
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map([investor_id], row_to_commitment)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };

        Ok(commitments)
    }

    /// Get every commitment in the store
    pub fn all_commitments(&self) -> Result<Vec<Commitment>> {
        let sql = format!("SELECT {COMMITMENT_COLUMNS} FROM commitments ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;

        let commitments = stmt
            .query_map([], row_to_commitment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(commitments)
    }

    /// Distinct asset classes, in order of first appearance.
    ///
    /// Scoped to one investor when `investor_id` is given, otherwise store-wide.
    pub fn distinct_asset_classes(&self, investor_id: Option<i64>) -> Result<Vec<String>> {
        let classes = match investor_id {
            Some(id) => {
                let mut stmt = self.conn.prepare(
                    "SELECT asset_class FROM commitments WHERE investor_id = ?1 GROUP BY asset_class ORDER BY MIN(id)",
                )?;
                let rows = stmt.query_map([id], |row| row.get(0))?
                    .collect::<rusqlite::Result<Vec<String>>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT asset_class FROM commitments GROUP BY asset_class ORDER BY MIN(id)",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?
                    .collect::<rusqlite::Result<Vec<String>>>()?;
                rows
            }
        };

        Ok(classes)
    }

    /// Count all commitments
    pub fn count_commitments(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM commitments", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Sum of every commitment amount in the store
    pub fn total_amount(&self) -> Result<f64> {
        let total: f64 = self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM commitments",
            [],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    // ========== Bulk Operations ==========

    /// Begin a batch write.
    ///
    /// Nothing written through the batch is visible until
    /// [`BatchWriter::commit`]; dropping the batch rolls everything back.
    pub fn begin_batch(&mut self) -> Result<BatchWriter<'_>> {
        let tx = self.conn.transaction()?;
        debug!("Batch transaction opened");
        Ok(BatchWriter { tx })
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            investors: self.count_investors()?,
            commitments: self.count_commitments()?,
            asset_classes: self.distinct_asset_classes(None)?.len(),
            total_amount: self.total_amount()?,
        })
    }
}

/// Scoped write handle over a single transaction
pub struct BatchWriter<'a> {
    tx: Transaction<'a>,
}

impl BatchWriter<'_> {
    /// Insert an investor inside the batch and return its assigned id
    pub fn insert_investor(&self, investor: &NewInvestor) -> Result<i64> {
        self.tx.execute(
            r#"
            INSERT INTO investors (investor_name, investor_type, investor_country, investor_date_added, investor_last_updated)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                investor.investor_name,
                investor.investor_type,
                investor.investor_country,
                investor.investor_date_added,
                investor.investor_last_updated,
            ],
        )?;
        Ok(self.tx.last_insert_rowid())
    }

    /// Insert many commitments inside the batch
    pub fn insert_commitments(&self, commitments: &[NewCommitment]) -> Result<usize> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO commitments (investor_id, asset_class, amount, currency) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for commitment in commitments {
            stmt.execute(params![
                commitment.investor_id,
                commitment.asset_class,
                commitment.amount,
                commitment.currency,
            ])?;
        }
        Ok(commitments.len())
    }

    /// Delete all data inside the batch
    pub fn clear_all(&self) -> Result<()> {
        clear_all(&self.tx)
    }

    /// Make every write of the batch durable
    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        debug!("Batch transaction committed");
        Ok(())
    }
}

fn clear_all(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM commitments", [])?;
    conn.execute("DELETE FROM investors", [])?;
    Ok(())
}

/// Helper to convert a row to an Investor
fn row_to_investor(row: &rusqlite::Row) -> rusqlite::Result<Investor> {
    Ok(Investor {
        id: row.get(0)?,
        investor_name: row.get(1)?,
        investor_type: row.get(2)?,
        investor_country: row.get(3)?,
        investor_date_added: row.get(4)?,
        investor_last_updated: row.get(5)?,
    })
}

/// Helper to convert a row to a Commitment
fn row_to_commitment(row: &rusqlite::Row) -> rusqlite::Result<Commitment> {
    Ok(Commitment {
        id: row.get(0)?,
        investor_id: row.get(1)?,
        asset_class: row.get(2)?,
        amount: row.get(3)?,
        currency: row.get(4)?,
    })
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub investors: usize,
    pub commitments: usize,
    pub asset_classes: usize,
    pub total_amount: f64,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Investors: {}", self.investors)?;
        writeln!(f, "  Commitments: {}", self.commitments)?;
        writeln!(f, "  Asset classes: {}", self.asset_classes)?;
        writeln!(f, "  Total committed: {:.2}", self.total_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_investor(name: &str) -> NewInvestor {
        NewInvestor {
            investor_name: name.to_string(),
            investor_type: "asset manager".to_string(),
            investor_country: "United Kingdom".to_string(),
            investor_date_added: NaiveDate::from_ymd_opt(2010, 6, 8).unwrap(),
            investor_last_updated: NaiveDate::from_ymd_opt(2024, 2, 21).unwrap(),
        }
    }

    fn sample_commitment(investor_id: i64, asset_class: &str, amount: f64) -> NewCommitment {
        NewCommitment {
            investor_id,
            asset_class: asset_class.to_string(),
            amount,
            currency: "GBP".to_string(),
        }
    }

    #[test]
    fn test_investor_crud() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let batch = store.begin_batch().unwrap();
        let id = batch.insert_investor(&sample_investor("Mjd Jedi fund")).unwrap();
        batch.commit().unwrap();

        let retrieved = store.get_investor(id).unwrap().unwrap();
        assert_eq!(retrieved.investor_name, "Mjd Jedi fund");
        assert_eq!(retrieved.investor_date_added, NaiveDate::from_ymd_opt(2010, 6, 8).unwrap());
        assert!(store.get_investor(id + 100).unwrap().is_none());
    }

    #[test]
    fn test_summaries_coalesce_missing_totals_to_zero() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let batch = store.begin_batch().unwrap();
        let with = batch.insert_investor(&sample_investor("with")).unwrap();
        batch.insert_investor(&sample_investor("without")).unwrap();
        batch
            .insert_commitments(&[
                sample_commitment(with, "Hedge Funds", 10.5),
                sample_commitment(with, "Private Equity", 20.0),
            ])
            .unwrap();
        batch.commit().unwrap();

        let summaries = store.list_investor_summaries().unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].investor_name, "with");
        assert!((summaries[0].total_commitment - 30.5).abs() < 1e-9);
        assert_eq!(summaries[1].total_commitment, 0.0);
    }

    #[test]
    fn test_distinct_asset_classes() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let batch = store.begin_batch().unwrap();
        let a = batch.insert_investor(&sample_investor("a")).unwrap();
        let b = batch.insert_investor(&sample_investor("b")).unwrap();
        batch
            .insert_commitments(&[
                sample_commitment(a, "Infrastructure", 1.0),
                sample_commitment(a, "Infrastructure", 2.0),
                sample_commitment(b, "Real Estate", 3.0),
                sample_commitment(b, "", 4.0),
            ])
            .unwrap();
        batch.commit().unwrap();

        assert_eq!(store.distinct_asset_classes(Some(a)).unwrap(), vec!["Infrastructure"]);
        assert_eq!(
            store.distinct_asset_classes(None).unwrap(),
            vec!["Infrastructure", "Real Estate", ""]
        );
    }

    #[test]
    fn test_investor_columns_reject_null() {
        let store = SqliteStore::open_in_memory().unwrap();

        let result = store.conn.execute(
            "INSERT INTO investors (investor_name, investor_type, investor_country, investor_date_added, investor_last_updated)
             VALUES ('n', NULL, '', '2010-06-08', '2024-02-21')",
            [],
        );
        assert!(result.is_err());

        let result = store.conn.execute(
            "INSERT INTO investors (investor_name, investor_date_added, investor_last_updated)
             VALUES ('n', '2010-06-08', '2024-02-21')",
            [],
        );
        assert!(result.is_ok());
        let investor = store.get_investor(store.conn.last_insert_rowid()).unwrap().unwrap();
        assert_eq!(investor.investor_type, "");
        assert_eq!(investor.investor_country, "");
    }

    #[test]
    fn test_dropped_batch_rolls_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        {
            let batch = store.begin_batch().unwrap();
            let id = batch.insert_investor(&sample_investor("ghost")).unwrap();
            batch.insert_commitments(&[sample_commitment(id, "Natural Resources", 5.0)]).unwrap();
        }

        assert_eq!(store.count_investors().unwrap(), 0);
        assert_eq!(store.count_commitments().unwrap(), 0);

        let batch = store.begin_batch().unwrap();
        let id = batch.insert_investor(&sample_investor("kept")).unwrap();
        batch.insert_commitments(&[sample_commitment(id, "Natural Resources", 5.0)]).unwrap();
        batch.commit().unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.investors, 1);
        assert_eq!(stats.commitments, 1);
        assert_eq!(stats.asset_classes, 1);
    }
}
