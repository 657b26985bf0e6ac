//! Configuration management for the backup catalog.
//!
//! Loads configuration from a TOML file; command-line flags override it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{CatalogError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Installed-apps inventory (JSON)
    #[serde(default = "default_inventory")]
    pub inventory: PathBuf,

    /// Root of the backup tree holding `<package>.log` files
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// Default bundle location for `export`
    #[serde(default = "default_bundle")]
    pub bundle: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// TOML file holding user preferences
    #[serde(default = "default_preferences_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Backups older than this many days match the "old" filter
    #[serde(default = "default_old_backup_days")]
    pub old_backup_days: i64,
}

// Default values
fn default_log_level() -> String {
    "warn".to_string()
}

fn default_inventory() -> PathBuf {
    PathBuf::from("apps.json")
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("backups")
}

fn default_bundle() -> PathBuf {
    PathBuf::from("catalog.bin")
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from("preferences.toml")
}

fn default_old_backup_days() -> i64 {
    7
}

/// A hundred years is plenty for "old".
const MAX_OLD_BACKUP_DAYS: i64 = 36_500;

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            inventory: default_inventory(),
            backup_dir: default_backup_dir(),
            bundle: default_bundle(),
        }
    }
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: default_preferences_path(),
        }
    }
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            old_backup_days: default_old_backup_days(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let days = self.filters.old_backup_days;
        if !(0..=MAX_OLD_BACKUP_DAYS).contains(&days) {
            return Err(CatalogError::Config(format!(
                "filters.old_backup_days must be between 0 and {}, got {}",
                MAX_OLD_BACKUP_DAYS, days
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            "[catalog]\nbackup_dir = \"/sdcard/OAndBackupX\"\n\n[filters]\nold_backup_days = 30\n",
        )?;

        let config = Config::from_file(&path)?;
        assert_eq!(config.catalog.backup_dir, PathBuf::from("/sdcard/OAndBackupX"));
        assert_eq!(config.catalog.inventory, PathBuf::from("apps.json"));
        assert_eq!(config.filters.old_backup_days, 30);
        assert_eq!(config.log.level, "warn");
        Ok(())
    }

    #[test]
    fn test_negative_age_is_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("catalog.toml");
        std::fs::write(&path, "[filters]\nold_backup_days = -1\n")?;

        assert!(matches!(Config::from_file(&path), Err(CatalogError::Config(_))));
        Ok(())
    }

    #[test]
    fn test_huge_age_is_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("catalog.toml");
        std::fs::write(&path, "[filters]\nold_backup_days = 1000000000000\n")?;

        assert!(matches!(Config::from_file(&path), Err(CatalogError::Config(_))));
        Ok(())
    }
}
