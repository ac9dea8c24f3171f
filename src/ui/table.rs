use tabled::{settings::Style, Table, Tabled};

use crate::model::{Commitment, InvestorSummary};
use crate::storage::DbStats;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
struct InvestorRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Added")]
    added: String,
    #[tabled(rename = "Total")]
    total: String,
}

#[derive(Tabled)]
struct CommitmentRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Asset class")]
    asset_class: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Currency")]
    currency: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &DbStats) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("Investors", &stats.investors.to_string());
    builder.add_row("Commitments", &stats.commitments.to_string());
    builder.add_row("Asset classes", &stats.asset_classes.to_string());
    builder.add_row("Total committed", &format_amount(stats.total_amount));
    builder.build()
}

pub fn investor_table(investors: &[InvestorSummary]) -> String {
    let rows: Vec<InvestorRow> = investors
        .iter()
        .map(|i| InvestorRow {
            id: i.id,
            name: i.investor_name.clone(),
            kind: i.investor_type.clone(),
            country: i.investor_country.clone(),
            added: i.investor_date_added.to_string(),
            total: format_amount(i.total_commitment),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn commitment_table(commitments: &[Commitment]) -> String {
    let rows: Vec<CommitmentRow> = commitments
        .iter()
        .map(|c| CommitmentRow {
            id: c.id,
            asset_class: c.asset_class.clone(),
            amount: format_amount(c.amount),
            currency: c.currency.clone(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn asset_class_table(asset_classes: &[String]) -> String {
    let mut builder = TableBuilder::new();
    for (idx, class) in asset_classes.iter().enumerate() {
        builder.add_row(&(idx + 1).to_string(), class);
    }
    builder.build()
}

/// Two decimals with thousands separators, e.g. `1,250,000.50`
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}
