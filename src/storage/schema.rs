//! Database schema definitions

/// SQL to create the investors table
pub const CREATE_INVESTORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS investors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    investor_name TEXT NOT NULL,
    investor_type TEXT NOT NULL DEFAULT '',
    investor_country TEXT NOT NULL DEFAULT '',
    investor_date_added TEXT NOT NULL,
    investor_last_updated TEXT NOT NULL
)
"#;

/// SQL to create the commitments table
/// Each row belongs to exactly one investor
pub const CREATE_COMMITMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS commitments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    investor_id INTEGER NOT NULL REFERENCES investors(id),
    asset_class TEXT NOT NULL,
    amount REAL NOT NULL DEFAULT 0,
    currency TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_investors_name ON investors(investor_name)",
    "CREATE INDEX IF NOT EXISTS idx_commitments_investor ON commitments(investor_id)",
    "CREATE INDEX IF NOT EXISTS idx_commitments_asset_class ON commitments(asset_class)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_INVESTORS_TABLE,
        CREATE_COMMITMENTS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
