//! CSV loader - populates the store from an investor/commitment export
//!
//! Every CSV row carries one commitment plus the full investor record it
//! belongs to. Investors are deduplicated by trimmed name within one load:
//! the first row for a name creates the investor, later rows only add
//! commitments and their investor columns are never read.
//!
//! A load runs inside a single transaction. Investors are inserted as they
//! are first seen so their ids can be attached to commitments; commitments
//! are buffered and written in bulk at the end. Any error drops the
//! transaction, so a failed load leaves the store untouched.
//!
//! The name cache lives only for one call. Loading the same file twice
//! duplicates every investor and commitment; callers that want a clean
//! reload use [`reload_csv`].

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::model::{NewCommitment, NewInvestor};
use crate::storage::SqliteStore;
use crate::{Error, Result};

pub const COL_INVESTOR_NAME: &str = "Investor Name";
/// Header spelling used by the reference export
pub const COL_INVESTOR_TYPE: &str = "Investory Type";
pub const COL_INVESTOR_TYPE_ALIAS: &str = "Investor Type";
pub const COL_INVESTOR_COUNTRY: &str = "Investor Country";
pub const COL_DATE_ADDED: &str = "Investor Date Added";
pub const COL_LAST_UPDATED: &str = "Investor Last Updated";
pub const COL_ASSET_CLASS: &str = "Commitment Asset Class";
pub const COL_AMOUNT: &str = "Commitment Amount";
pub const COL_CURRENCY: &str = "Commitment Currency";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Seed files tried at startup, in order
pub const DEFAULT_SEED_PATHS: &[&str] = &["db/data.csv", "data.csv"];

/// Outcome of a successful load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct LoadReport {
    /// Data rows read (header excluded)
    pub rows: usize,
    pub investors_created: usize,
    pub commitments_created: usize,
}

impl std::fmt::Display for LoadReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rows -> {} investors, {} commitments",
            self.rows, self.investors_created, self.commitments_created
        )
    }
}

/// Load a CSV file into the store, appending to whatever is there
pub fn load_csv(store: &mut SqliteStore, path: &Path) -> Result<LoadReport> {
    info!("Loading investors from {}", path.display());
    let reader = csv::Reader::from_path(path)?;
    ingest(store, reader, false)
}

/// Replace the store contents with a CSV file, in one transaction
pub fn reload_csv(store: &mut SqliteStore, path: &Path) -> Result<LoadReport> {
    info!("Reloading investors from {}", path.display());
    let reader = csv::Reader::from_path(path)?;
    ingest(store, reader, true)
}

/// Load CSV data from any reader (headers expected on the first line)
pub fn load_from_reader<R: Read>(store: &mut SqliteStore, input: R) -> Result<LoadReport> {
    ingest(store, csv::Reader::from_reader(input), false)
}

/// Load the first existing seed file, but only into an empty store.
///
/// Returns `None` when the store already holds investors or no candidate
/// file exists.
pub fn seed_if_empty(store: &mut SqliteStore, candidates: &[PathBuf]) -> Result<Option<LoadReport>> {
    let existing = store.count_investors()?;
    if existing > 0 {
        debug!("Store already holds {} investors, skipping seed", existing);
        return Ok(None);
    }

    match candidates.iter().find(|p| p.is_file()) {
        Some(path) => {
            let report = load_csv(store, path)?;
            info!("Seeded store from {}: {}", path.display(), report);
            Ok(Some(report))
        }
        None => {
            warn!("Store is empty and no seed file found (tried {:?})", candidates);
            Ok(None)
        }
    }
}

fn ingest<R: Read>(store: &mut SqliteStore, mut reader: csv::Reader<R>, replace: bool) -> Result<LoadReport> {
    let started = Instant::now();
    let columns = ColumnMap::from_headers(reader.headers()?)?;

    let batch = store.begin_batch()?;
    if replace {
        batch.clear_all()?;
    }

    let mut investor_cache: HashMap<String, i64> = HashMap::new();
    let mut pending: Vec<NewCommitment> = Vec::new();
    let mut report = LoadReport::default();

    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let row = idx + 1;
        report.rows += 1;

        let name = columns.field(&record, columns.name).trim();
        let investor_id = match investor_cache.get(name) {
            Some(&id) => id,
            None => {
                let investor = columns.parse_investor(&record, row)?;
                let id = batch.insert_investor(&investor)?;
                debug!("Created investor {} ({})", id, investor.investor_name);
                investor_cache.insert(investor.investor_name, id);
                report.investors_created += 1;
                id
            }
        };

        pending.push(columns.parse_commitment(&record, row, investor_id)?);
    }

    report.commitments_created = batch.insert_commitments(&pending)?;
    batch.commit()?;

    info!("Load complete in {:?}: {}", started.elapsed(), report);
    Ok(report)
}

/// Positions of the required columns within a header row
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    name: usize,
    kind: usize,
    country: usize,
    date_added: usize,
    last_updated: usize,
    asset_class: usize,
    amount: usize,
    currency: usize,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let position = |wanted: &str| headers.iter().position(|h| h.trim() == wanted);
        let require = |wanted: &str| position(wanted).ok_or_else(|| Error::MissingColumn(wanted.to_string()));

        let kind = position(COL_INVESTOR_TYPE)
            .or_else(|| position(COL_INVESTOR_TYPE_ALIAS))
            .ok_or_else(|| Error::MissingColumn(COL_INVESTOR_TYPE.to_string()))?;

        Ok(Self {
            name: require(COL_INVESTOR_NAME)?,
            kind,
            country: require(COL_INVESTOR_COUNTRY)?,
            date_added: require(COL_DATE_ADDED)?,
            last_updated: require(COL_LAST_UPDATED)?,
            asset_class: require(COL_ASSET_CLASS)?,
            amount: require(COL_AMOUNT)?,
            currency: require(COL_CURRENCY)?,
        })
    }

    fn field<'r>(&self, record: &'r StringRecord, idx: usize) -> &'r str {
        record.get(idx).unwrap_or("")
    }

    fn parse_investor(&self, record: &StringRecord, row: usize) -> Result<NewInvestor> {
        Ok(NewInvestor {
            investor_name: self.field(record, self.name).trim().to_string(),
            investor_type: self.field(record, self.kind).trim().to_string(),
            investor_country: self.field(record, self.country).trim().to_string(),
            investor_date_added: parse_date(self.field(record, self.date_added), row, COL_DATE_ADDED)?,
            investor_last_updated: parse_date(self.field(record, self.last_updated), row, COL_LAST_UPDATED)?,
        })
    }

    fn parse_commitment(&self, record: &StringRecord, row: usize, investor_id: i64) -> Result<NewCommitment> {
        Ok(NewCommitment {
            investor_id,
            asset_class: self.field(record, self.asset_class).trim().to_string(),
            amount: parse_amount(self.field(record, self.amount), row)?,
            currency: self.field(record, self.currency).trim().to_string(),
        })
    }
}

/// Parse a `YYYY-MM-DD` date
fn parse_date(raw: &str, row: usize, column: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| Error::Parse {
        row,
        column: column.to_string(),
        message: format!("invalid date '{}': {}", raw, e),
    })
}

/// Parse a non-negative commitment amount; an empty field means 0
fn parse_amount(raw: &str, row: usize) -> Result<f64> {
    if raw.is_empty() {
        return Ok(0.0);
    }

    let invalid = |detail: &str| Error::Parse {
        row,
        column: COL_AMOUNT.to_string(),
        message: format!("invalid amount '{}': {}", raw, detail),
    };

    let amount: f64 = raw.trim().parse().map_err(|_| invalid("not a number"))?;
    if !amount.is_finite() {
        return Err(invalid("not a finite number"));
    }
    if amount < 0.0 {
        return Err(invalid("negative amount"));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Investor Name,Investory Type,Investor Country,Investor Date Added,Investor Last Updated,Commitment Asset Class,Commitment Amount,Commitment Currency\n";

    fn csv_with(rows: &[&str]) -> String {
        let mut data = HEADER.to_string();
        for row in rows {
            data.push_str(row);
            data.push('\n');
        }
        data
    }

    #[test]
    fn test_dedup_by_trimmed_name() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let data = csv_with(&[
            "Ioo Gryffindor fund,fund manager,Singapore,2000-07-06,2024-02-21,Infrastructure,15000000,GBP",
            "  Ioo Gryffindor fund  ,bank,France,not-a-date,also-bad,Hedge Funds,31000000,GBP",
            "Mjd Jedi fund,bank,United Kingdom,2010-06-08,2024-02-21,Natural Resources,5000000,GBP",
        ]);

        let report = load_from_reader(&mut store, data.as_bytes()).unwrap();
        assert_eq!(report, LoadReport { rows: 3, investors_created: 2, commitments_created: 3 });

        let summaries = store.list_investor_summaries().unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].investor_name, "Ioo Gryffindor fund");
        assert_eq!(summaries[0].investor_type, "fund manager");
        assert_eq!(summaries[0].investor_country, "Singapore");
        assert_eq!(summaries[0].total_commitment, 46_000_000.0);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let data = csv_with(&[" Trim fund , bank , Japan , 2001-01-02 , 2002-03-04 , Real Estate , 12.5 , JPY "]);

        load_from_reader(&mut store, data.as_bytes()).unwrap();

        let investor = store.list_investor_summaries().unwrap().remove(0);
        assert_eq!(investor.investor_name, "Trim fund");
        assert_eq!(investor.investor_type, "bank");
        assert_eq!(investor.investor_country, "Japan");

        let commitment = store.all_commitments().unwrap().remove(0);
        assert_eq!(commitment.asset_class, "Real Estate");
        assert_eq!(commitment.currency, "JPY");
        assert_eq!(commitment.amount, 12.5);
    }

    #[test]
    fn test_empty_amount_loads_as_zero() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let data = csv_with(&["Zero fund,bank,Japan,2001-01-02,2002-03-04,Private Debt,,JPY"]);

        load_from_reader(&mut store, data.as_bytes()).unwrap();

        let commitments = store.all_commitments().unwrap();
        assert_eq!(commitments.len(), 1);
        assert_eq!(commitments[0].amount, 0.0);
    }

    #[test]
    fn test_bad_amount_aborts_whole_load() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let data = csv_with(&[
            "Good fund,bank,Japan,2001-01-02,2002-03-04,Private Debt,100,JPY",
            "Other fund,bank,Japan,2001-01-02,2002-03-04,Private Debt,lots,JPY",
        ]);

        let err = load_from_reader(&mut store, data.as_bytes()).unwrap_err();
        match err {
            Error::Parse { row, ref column, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, COL_AMOUNT);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
        assert_eq!(store.count_investors().unwrap(), 0);
        assert_eq!(store.count_commitments().unwrap(), 0);
    }

    #[test]
    fn test_negative_amount_aborts_whole_load() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let data = csv_with(&["Short fund,bank,Japan,2001-01-02,2002-03-04,Hedge Funds,-500,JPY"]);

        let err = load_from_reader(&mut store, data.as_bytes()).unwrap_err();
        match err {
            Error::Parse { row, ref column, ref message } => {
                assert_eq!(row, 1);
                assert_eq!(column, COL_AMOUNT);
                assert!(message.contains("negative"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
        assert_eq!(store.count_investors().unwrap(), 0);
        assert_eq!(store.total_amount().unwrap(), 0.0);
    }

    #[test]
    fn test_bad_date_aborts_whole_load() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let data = csv_with(&[
            "Good fund,bank,Japan,2001-01-02,2002-03-04,Private Debt,100,JPY",
            "Late fund,bank,Japan,02/01/2001,2002-03-04,Private Debt,100,JPY",
        ]);

        let err = load_from_reader(&mut store, data.as_bytes()).unwrap_err();
        assert!(err.is_parse());
        assert_eq!(store.count_investors().unwrap(), 0);
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let data = "Investor Name,Investor Country\nA,B\n";

        let err = load_from_reader(&mut store, data.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(_)));
    }

    #[test]
    fn test_investor_type_alias_header() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let data = HEADER.replace("Investory Type", "Investor Type")
            + "Alias fund,wealth manager,Italy,2001-01-02,2002-03-04,Hedge Funds,1,EUR\n";

        load_from_reader(&mut store, data.as_bytes()).unwrap();
        assert_eq!(store.list_investor_summaries().unwrap()[0].investor_type, "wealth manager");
    }

    #[test]
    fn test_loading_twice_duplicates_and_reload_replaces() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(csv_with(&[
            "A fund,bank,Japan,2001-01-02,2002-03-04,Private Debt,1,JPY",
            "B fund,bank,Japan,2001-01-02,2002-03-04,Private Debt,2,JPY",
        ]).as_bytes()).unwrap();

        let mut store = SqliteStore::open_in_memory().unwrap();
        load_csv(&mut store, file.path()).unwrap();
        load_csv(&mut store, file.path()).unwrap();
        assert_eq!(store.count_investors().unwrap(), 4);
        assert_eq!(store.count_commitments().unwrap(), 4);

        reload_csv(&mut store, file.path()).unwrap();
        assert_eq!(store.count_investors().unwrap(), 2);
        assert_eq!(store.count_commitments().unwrap(), 2);
    }

    #[test]
    fn test_seed_only_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let seed = dir.path().join("data.csv");
        std::fs::write(&seed, csv_with(&["A fund,bank,Japan,2001-01-02,2002-03-04,Private Debt,1,JPY"])).unwrap();
        let candidates = vec![dir.path().join("missing.csv"), seed];

        let mut store = SqliteStore::open_in_memory().unwrap();
        let first = seed_if_empty(&mut store, &candidates).unwrap();
        assert_eq!(first.map(|r| r.investors_created), Some(1));

        let second = seed_if_empty(&mut store, &candidates).unwrap();
        assert!(second.is_none());
        assert_eq!(store.count_investors().unwrap(), 1);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("", 1).unwrap(), 0.0);
        assert_eq!(parse_amount(" 42.25 ", 1).unwrap(), 42.25);
        assert!(parse_amount("   ", 1).is_err());
        assert!(parse_amount("inf", 1).is_err());
        assert!(parse_amount("-0.01", 1).is_err());
    }
}
