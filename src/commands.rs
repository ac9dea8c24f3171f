use investor_api::config::{self, ApiConfig};
use investor_api::loader;
use investor_api::ui::{self, Icons};
use investor_api::{QueryEngine, SqliteStore};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(&self) -> bool {
        matches!(self, OutputMode::Human)
    }
}

pub fn emit_success(output_mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if output_mode == OutputMode::Json {
        let envelope = serde_json::json!({
            "status": "ok",
            "command": command,
            "data": data,
        });
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    Ok(())
}

pub fn emit_error(output_mode: OutputMode, err: &anyhow::Error) {
    match output_mode {
        OutputMode::Human => ui::error(&format!("{:#}", err)),
        OutputMode::Json => {
            let envelope = serde_json::json!({
                "status": "error",
                "error": format!("{:#}", err),
            });
            println!("{}", envelope);
        }
    }
}

fn resolve_database(config: &ApiConfig, database: Option<PathBuf>) -> PathBuf {
    database.unwrap_or_else(|| config.database_path())
}

fn open_store(config: &ApiConfig, database: Option<PathBuf>) -> anyhow::Result<(SqliteStore, PathBuf)> {
    let path = resolve_database(config, database);
    config::ensure_db_dir(&path)?;
    let store = SqliteStore::open(&path)?;
    Ok((store, path))
}

pub async fn run_serve(
    config: &ApiConfig,
    port: Option<u16>,
    database: Option<PathBuf>,
    seed: Option<PathBuf>,
    no_seed: bool,
) -> anyhow::Result<()> {
    let database_path = prepare_database(config, database, seed, no_seed)?;

    let port = port.unwrap_or_else(|| config.port());
    ui::header(&format!("Serving {} on port {}", database_path.display(), port));
    investor_api::server::start_server(port, database_path, &config.allowed_origins()).await
}

/// Open (and create) the database, seed it when empty, then release it
fn prepare_database(
    config: &ApiConfig,
    database: Option<PathBuf>,
    seed: Option<PathBuf>,
    no_seed: bool,
) -> anyhow::Result<PathBuf> {
    let (mut store, database_path) = open_store(config, database)?;

    if !no_seed {
        let candidates = match seed {
            Some(path) => vec![path],
            None => config.seed_paths(),
        };
        if let Some(report) = loader::seed_if_empty(&mut store, &candidates)? {
            ui::success(&format!("Seeded database: {}", report));
        }
    }
    Ok(database_path)
}

pub fn run_load(
    config: &ApiConfig,
    output_mode: OutputMode,
    csv_path: &Path,
    database: Option<PathBuf>,
    replace: bool,
) -> anyhow::Result<()> {
    let (mut store, database_path) = open_store(config, database)?;
    let started = Instant::now();

    if output_mode.is_human() {
        ui::header(&format!("Loading {}", csv_path.display()));
        ui::info("Database", &database_path.display().to_string());
    }

    let report = if replace {
        loader::reload_csv(&mut store, csv_path)?
    } else {
        loader::load_csv(&mut store, csv_path)?
    };

    if output_mode.is_human() {
        ui::section("Load complete");
        ui::summary_row("Rows:", &report.rows.to_string());
        ui::summary_row("Investors created:", &report.investors_created.to_string());
        ui::summary_row("Commitments created:", &report.commitments_created.to_string());
        ui::timing(&format!("{:.2?}", started.elapsed()));
    } else {
        emit_success(output_mode, "load", serde_json::to_value(report)?)?;
    }
    Ok(())
}

pub fn run_investors(config: &ApiConfig, output_mode: OutputMode, database: Option<PathBuf>) -> anyhow::Result<()> {
    let (store, _) = open_store(config, database)?;
    let investors = QueryEngine::new(&store).list_investors()?;

    if output_mode.is_human() {
        if investors.is_empty() {
            ui::warn("No investors found.");
        } else {
            println!("{}", ui::investor_table(&investors));
        }
    } else {
        emit_success(output_mode, "investors", serde_json::to_value(&investors)?)?;
    }
    Ok(())
}

pub fn run_investor(config: &ApiConfig, output_mode: OutputMode, id: i64, database: Option<PathBuf>) -> anyhow::Result<()> {
    let (store, _) = open_store(config, database)?;
    let investor = QueryEngine::new(&store).require_investor(id)?;

    if output_mode.is_human() {
        println!("{} {}", Icons::PERSON, investor.investor_name.bold());
        ui::info("ID", &investor.id.to_string());
        ui::info("Type", &investor.investor_type);
        ui::info("Country", &investor.investor_country);
        ui::info("Added", &investor.investor_date_added.to_string());
        ui::info("Last updated", &investor.investor_last_updated.to_string());
    } else {
        emit_success(output_mode, "investor", serde_json::to_value(&investor)?)?;
    }
    Ok(())
}

pub fn run_commitments(
    config: &ApiConfig,
    output_mode: OutputMode,
    investor: Option<i64>,
    asset_class: Option<&str>,
    database: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (store, _) = open_store(config, database)?;
    let engine = QueryEngine::new(&store);

    let listing = match investor {
        Some(id) => engine.investor_commitments(id, asset_class)?,
        None => engine.list_all_commitments()?,
    };

    if output_mode.is_human() {
        if listing.commitments.is_empty() {
            ui::warn("No commitments found.");
        } else {
            println!("{}", ui::commitment_table(&listing.commitments));
        }
        let currency = listing
            .commitments
            .first()
            .map(|c| c.currency.as_str())
            .filter(|code| listing.commitments.iter().all(|c| c.currency == *code));
        println!(
            "{} {} {}",
            Icons::MONEY,
            ui::dim("Total:"),
            ui::amount(listing.total_amount(), currency)
        );
        println!(
            "{} {}",
            Icons::TAG,
            ui::dim(&format!("Asset classes: {}", listing.asset_classes.join(", ")))
        );
    } else {
        emit_success(output_mode, "commitments", serde_json::to_value(&listing)?)?;
    }
    Ok(())
}

pub fn run_asset_classes(config: &ApiConfig, output_mode: OutputMode, database: Option<PathBuf>) -> anyhow::Result<()> {
    let (store, _) = open_store(config, database)?;
    let asset_classes = QueryEngine::new(&store).list_asset_classes()?;

    if output_mode.is_human() {
        if asset_classes.is_empty() {
            ui::warn("No asset classes found.");
        } else {
            println!("{}", ui::asset_class_table(&asset_classes));
        }
    } else {
        emit_success(output_mode, "asset-classes", serde_json::json!({ "asset_classes": asset_classes }))?;
    }
    Ok(())
}

pub fn run_stats(config: &ApiConfig, output_mode: OutputMode, database: Option<PathBuf>) -> anyhow::Result<()> {
    let (store, database_path) = open_store(config, database)?;
    let stats = QueryEngine::new(&store).stats()?;

    if output_mode.is_human() {
        println!("{} Statistics ({})", Icons::STATS, database_path.display());
        println!("{}", ui::stats_table(&stats));
    } else {
        emit_success(output_mode, "stats", serde_json::to_value(&stats)?)?;
    }
    Ok(())
}

pub fn run_init(config_path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = config_path.map(Path::to_path_buf).unwrap_or_else(config::default_config_path);
    config::write_config(&path, &ApiConfig::with_defaults(), force)?;
    ui::success(&format!("{} Wrote {}", Icons::FILE, path.display()));
    Ok(())
}
