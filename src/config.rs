use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::loader::DEFAULT_SEED_PATHS;

pub const DEFAULT_PORT: u16 = 8000;

/// Origins of the local dashboard dev servers
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    pub database: Option<String>,
    pub port: Option<u16>,
    pub seed_paths: Option<Vec<String>>,
    pub allowed_origins: Option<Vec<String>>,
}

impl ApiConfig {
    /// A config with every field filled with its default, for `init`
    pub fn with_defaults() -> Self {
        Self {
            database: Some(default_database_path().to_string_lossy().into_owned()),
            port: Some(DEFAULT_PORT),
            seed_paths: Some(DEFAULT_SEED_PATHS.iter().map(|s| s.to_string()).collect()),
            allowed_origins: Some(DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn seed_paths(&self) -> Vec<PathBuf> {
        match &self.seed_paths {
            Some(paths) => paths.iter().map(PathBuf::from).collect(),
            None => DEFAULT_SEED_PATHS.iter().map(PathBuf::from).collect(),
        }
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        match &self.allowed_origins {
            Some(origins) => origins.clone(),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("investor-api.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("investors.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ApiConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ApiConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &ApiConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("investor-api.toml");
        std::fs::write(&path, "port = 9100\n").unwrap();

        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.port(), 9100);
        assert_eq!(config.database_path(), default_database_path());
        assert_eq!(config.seed_paths(), vec![PathBuf::from("db/data.csv"), PathBuf::from("data.csv")]);
        assert_eq!(config.allowed_origins().len(), 4);
    }

    #[test]
    fn test_write_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("investor-api.toml");

        write_config(&path, &ApiConfig::with_defaults(), false).unwrap();
        assert!(write_config(&path, &ApiConfig::default(), false).is_err());
        write_config(&path, &ApiConfig::default(), true).unwrap();

        let reloaded = load_config(Some(&path)).unwrap().unwrap();
        assert!(reloaded.port.is_none());
    }
}
