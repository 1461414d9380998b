//! CLI configuration utilities

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persistent CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Base URL of the admin API
    pub base_url: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

/// Resolve the data directory: flag, then `ATELIER_DATA_DIR`, then platform default
pub fn data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Ok(dir) = std::env::var("ATELIER_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    Ok(dirs::data_dir()
        .context("no data directory available on this platform")?
        .join("atelier"))
}

/// Load CLI configuration from a JSON file, defaulting when absent
pub fn load_config(data_dir: &Path) -> Result<CliConfig> {
    let path = data_dir.join("config.json");
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(config)
}

/// Save CLI configuration to its JSON file
pub fn save_config(config: &CliConfig, data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    let path = data_dir.join("config.json");
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
    }

    #[test]
    fn config_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig {
            base_url: "https://admin.example.com".to_string(),
        };
        save_config(&config, dir.path()).unwrap();
        let loaded = load_config(dir.path()).unwrap();
        assert_eq!(loaded.base_url, "https://admin.example.com");
    }
}
